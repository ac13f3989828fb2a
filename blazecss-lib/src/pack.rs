//! Packers turn groups of source files into write directives.
//!
//! A [`Bundler`] maps file extensions to [`Packer`] implementations and falls
//! back to an optional default packer. Finding the files and writing or
//! compressing the directives is left to the caller.

use crate::error::PackError;
use crate::rule::Rule;
use crate::style::blaze_css::minify_css;
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// A source file handed to a packer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatement {
    /// Path relative to the directory root.
    pub path: String,
    pub abs_path: String,
    pub content: String,
}

/// The directory being packed, with its files grouped by extension.
#[derive(Debug, Clone, Default)]
pub struct DirStatement {
    pub root: String,
    pub files_by_ext: BTreeMap<String, Vec<FileStatement>>,
}

/// Packed output for one origin file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteDirective {
    pub origin_path: String,
    pub origin_abs_path: String,
    pub content: Vec<u8>,
}

pub trait Packer: Send + Sync {
    fn pack(
        &self,
        files: &[FileStatement],
        dir: &DirStatement,
    ) -> Result<Vec<WriteDirective>, PackError>;
}

impl DirStatement {
    pub fn new(root: &str) -> Self {
        DirStatement {
            root: root.to_string(),
            files_by_ext: BTreeMap::new(),
        }
    }

    /// Files its extension group from the last `.`-separated part of the path.
    pub fn add_file(&mut self, file: FileStatement) {
        let ext = file
            .path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_string())
            .unwrap_or_default();
        self.files_by_ext.entry(ext).or_default().push(file);
    }
}

/// Dispatches each extension group of a directory to its packer.
#[derive(Default)]
pub struct Bundler {
    default_packer: Option<Box<dyn Packer>>,
    packers: HashMap<String, Box<dyn Packer>>,
}

impl Bundler {
    pub fn new(default_packer: Option<Box<dyn Packer>>) -> Self {
        Bundler {
            default_packer,
            packers: HashMap::new(),
        }
    }

    /// Sets the packer for files with extension `ext` (without the dot).
    pub fn register(&mut self, ext: &str, packer: Box<dyn Packer>) {
        self.packers.insert(ext.to_string(), packer);
    }

    /// Packs every extension group of `dir`.
    ///
    /// Groups are packed in parallel. If any fail, the error of the first
    /// failing extension in sorted order is returned.
    pub fn build(
        &self,
        dir: &DirStatement,
    ) -> Result<BTreeMap<String, Vec<WriteDirective>>, PackError> {
        let packed: Vec<(String, Result<Vec<WriteDirective>, PackError>)> = dir
            .files_by_ext
            .par_iter()
            .map(|(ext, files)| (ext.clone(), self.pack_group(ext, files, dir)))
            .collect();

        let mut directives = BTreeMap::new();
        for (ext, result) in packed {
            directives.insert(ext, result?);
        }
        Ok(directives)
    }

    fn pack_group(
        &self,
        ext: &str,
        files: &[FileStatement],
        dir: &DirStatement,
    ) -> Result<Vec<WriteDirective>, PackError> {
        if let Some(packer) = self.packers.get(ext) {
            debug!("packing {} {:?} files", files.len(), ext);
            return packer.pack(files, dir);
        }

        match &self.default_packer {
            Some(packer) => {
                warn!("no packer registered for {:?}, using the default", ext);
                packer.pack(files, dir)
            }
            None => Err(PackError::NoPacker(ext.to_string())),
        }
    }
}

/// Renders each file as a standalone rule and emits its stylesheet.
#[derive(Debug, Clone, Default)]
pub struct CssPacker {
    pub binding: serde_json::Value,
    pub parent_scope: String,
    pub minify: bool,
}

impl Packer for CssPacker {
    fn pack(
        &self,
        files: &[FileStatement],
        _dir: &DirStatement,
    ) -> Result<Vec<WriteDirective>, PackError> {
        files
            .iter()
            .map(|file| {
                let sheet = Rule::parse(&file.content)
                    .and_then(|rule| rule.stylesheet(&self.binding, &self.parent_scope))
                    .map_err(|source| PackError::Rule {
                        path: file.path.clone(),
                        source,
                    })?;

                let mut css = sheet.to_css();
                if self.minify {
                    css = minify_css(&css)?;
                }

                Ok(WriteDirective {
                    origin_path: file.path.clone(),
                    origin_abs_path: file.abs_path.clone(),
                    content: css.into_bytes(),
                })
            })
            .collect()
    }
}
