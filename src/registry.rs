//! Host procedure declarations and dispatch
//!
//! The host knows the plugin by three procedure names. Each name maps to a
//! fixed [`ProcedureKind`] and metadata, resolved once when the registry is
//! built.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::converter::CommandRunner;
use crate::error::PipelineError;
use crate::host::HostCodec;
use crate::paths::TEXTURE_EXTENSION;
use crate::pipeline::{ConversionPipeline, ConversionResult, SaveOptions};

pub const LOAD_PROCEDURE: &str = "file-nutexb-load";
pub const SAVE_PROCEDURE: &str = "file-nutexb-save";
pub const THUMBNAIL_PROCEDURE: &str = "file-nutexb-load-thumb";

pub const MIME_TYPE: &str = "image/nutexb";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProcedureKind {
    Load,
    Save,
    Thumbnail,
}

/// Declared metadata for one procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcedureInfo {
    pub name: &'static str,
    pub kind: ProcedureKind,
    pub menu_label: Option<&'static str>,
    pub blurb: &'static str,
    pub help: &'static str,
    pub extensions: Option<&'static str>,
    pub mime_types: Option<&'static str>,
    pub image_types: Option<&'static str>,
    pub thumbnail_loader: Option<&'static str>,
    pub authors: &'static str,
    pub copyright: &'static str,
    pub date: &'static str,
}

const AUTHORS: &str = "Carlos Aguilar";
const DATE: &str = "2024";

const LOAD_DOC: &str = "Load a Namco Universal Texture Binary (.nutexb) file.";
const SAVE_DOC: &str = "Save a Namco Universal Texture Binary (.nutexb) file.";
const THUMBNAIL_DOC: &str = "Loads a thumbnail from a nutexb file.";

impl ProcedureInfo {
    pub fn for_kind(kind: ProcedureKind) -> Self {
        match kind {
            ProcedureKind::Load => Self {
                name: LOAD_PROCEDURE,
                kind,
                menu_label: Some("Nutexb"),
                blurb: LOAD_DOC,
                help: LOAD_DOC,
                extensions: Some(TEXTURE_EXTENSION),
                mime_types: Some(MIME_TYPE),
                image_types: None,
                thumbnail_loader: Some(THUMBNAIL_PROCEDURE),
                authors: AUTHORS,
                copyright: AUTHORS,
                date: DATE,
            },
            ProcedureKind::Save => Self {
                name: SAVE_PROCEDURE,
                kind,
                menu_label: Some("nutexb"),
                blurb: SAVE_DOC,
                help: SAVE_DOC,
                extensions: Some(TEXTURE_EXTENSION),
                mime_types: None,
                image_types: Some("*"),
                thumbnail_loader: None,
                authors: AUTHORS,
                copyright: AUTHORS,
                date: DATE,
            },
            ProcedureKind::Thumbnail => Self {
                name: THUMBNAIL_PROCEDURE,
                kind,
                menu_label: None,
                blurb: THUMBNAIL_DOC,
                help: THUMBNAIL_DOC,
                extensions: None,
                mime_types: None,
                image_types: None,
                thumbnail_loader: None,
                authors: AUTHORS,
                copyright: AUTHORS,
                date: DATE,
            },
        }
    }
}

/// Arguments the host passes when running a procedure
#[derive(Debug)]
pub enum ProcedureCall<'a, I> {
    Load {
        file: PathBuf,
    },
    Save {
        image: &'a I,
        file: PathBuf,
        options: SaveOptions,
    },
    Thumbnail {
        file: PathBuf,
        size: u32,
    },
}

impl<I> ProcedureCall<'_, I> {
    pub fn kind(&self) -> ProcedureKind {
        match self {
            ProcedureCall::Load { .. } => ProcedureKind::Load,
            ProcedureCall::Save { .. } => ProcedureKind::Save,
            ProcedureCall::Thumbnail { .. } => ProcedureKind::Thumbnail,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ProcedureCall::Load { .. } => "load",
            ProcedureCall::Save { .. } => "save",
            ProcedureCall::Thumbnail { .. } => "thumbnail",
        }
    }
}

/// The procedures this plugin declares, in registration order
pub struct ProcedureRegistry {
    procedures: Vec<ProcedureInfo>,
    by_name: HashMap<&'static str, ProcedureKind>,
}

impl Default for ProcedureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcedureRegistry {
    pub fn new() -> Self {
        let procedures: Vec<ProcedureInfo> = [
            ProcedureKind::Thumbnail,
            ProcedureKind::Load,
            ProcedureKind::Save,
        ]
        .into_iter()
        .map(ProcedureInfo::for_kind)
        .collect();

        let by_name = procedures.iter().map(|p| (p.name, p.kind)).collect();

        Self { procedures, by_name }
    }

    /// Procedure names, as reported to the host
    pub fn query_procedures(&self) -> Vec<&'static str> {
        self.procedures.iter().map(|p| p.name).collect()
    }

    pub fn procedures(&self) -> &[ProcedureInfo] {
        &self.procedures
    }

    pub fn lookup(&self, name: &str) -> Option<&ProcedureInfo> {
        let kind = self.by_name.get(name)?;
        self.procedures.iter().find(|p| p.kind == *kind)
    }

    /// Run the named procedure against `pipeline`
    pub fn dispatch<H, R>(
        &self,
        pipeline: &ConversionPipeline<H, R>,
        name: &str,
        call: ProcedureCall<'_, H::Image>,
    ) -> ConversionResult<H::Image>
    where
        H: HostCodec,
        R: CommandRunner,
    {
        let Some(info) = self.lookup(name) else {
            return ConversionResult::from_outcome(Err(PipelineError::UnknownProcedure(
                name.to_string(),
            )));
        };

        if info.kind != call.kind() {
            return ConversionResult::from_outcome(Err(PipelineError::ProcedureMismatch {
                procedure: info.name,
                call: call.label(),
            }));
        }

        debug!("Dispatching {}", info.name);
        match call {
            ProcedureCall::Load { file } => pipeline.load(&file),
            ProcedureCall::Save {
                image,
                file,
                options,
            } => pipeline.save_with(image, &file, options),
            ProcedureCall::Thumbnail { file, size } => pipeline.thumbnail(&file, size),
        }
    }
}
