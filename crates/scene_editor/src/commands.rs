//! Menu commands exposed to the host

use std::path::PathBuf;

use crate::error::{EditorError, Result};
use crate::registry::DocumentRegistry;

/// Commands the scene editor adds to the host's File menu
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneCommand {
    /// Export the active scene document
    ExportScene,
    /// Export every open scene document
    ExportLevel,
}

impl SceneCommand {
    pub const ALL: [SceneCommand; 2] = [Self::ExportScene, Self::ExportLevel];

    /// Menu text
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExportScene => "Export Scene",
            Self::ExportLevel => "Export Level",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ExportScene => "Export the active scene to the text scene format",
            Self::ExportLevel => "Export every open scene to the text scene format",
        }
    }

    pub fn can_do(&self, registry: &DocumentRegistry) -> bool {
        match self {
            Self::ExportScene => registry.active_scene().is_some(),
            Self::ExportLevel => registry.any_scene(),
        }
    }

    /// Run the command, returning the files written.
    ///
    /// Export Level writes one `.scene` file per open scene document, in
    /// registry order, and stops at the first failure.
    pub fn do_command(&self, registry: &DocumentRegistry) -> Result<Vec<PathBuf>> {
        if !self.can_do(registry) {
            return Err(EditorError::CommandUnavailable(self.name()));
        }
        let written = match self {
            Self::ExportScene => {
                let doc = registry
                    .active_scene()
                    .ok_or(EditorError::CommandUnavailable(self.name()))?;
                vec![doc.export()?]
            }
            Self::ExportLevel => registry
                .scene_documents()
                .map(|doc| doc.export())
                .collect::<Result<Vec<_>>>()?,
        };
        log::info!("{}: wrote {} file(s)", self.name(), written.len());
        Ok(written)
    }
}

impl std::fmt::Display for SceneCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SceneDocument;
    use crate::registry::OpenDocument;

    #[test]
    fn test_disabled_without_scenes() {
        let mut registry = DocumentRegistry::new();
        for command in SceneCommand::ALL {
            assert!(!command.can_do(&registry));
        }
        registry.add(OpenDocument::Foreign {
            uri: PathBuf::from("readme.txt"),
            type_name: "Text".into(),
        });
        assert!(matches!(
            SceneCommand::ExportScene.do_command(&registry),
            Err(EditorError::CommandUnavailable("Export Scene"))
        ));
    }

    #[test]
    fn test_export_scene_enabled_only_for_active_scene() {
        let mut registry = DocumentRegistry::new();
        registry.add(OpenDocument::Scene(
            SceneDocument::new_untitled(scene_schema::builtin()).unwrap(),
        ));
        assert!(SceneCommand::ExportScene.can_do(&registry));

        registry.add(OpenDocument::Foreign {
            uri: PathBuf::from("readme.txt"),
            type_name: "Text".into(),
        });
        assert!(!SceneCommand::ExportScene.can_do(&registry));
        assert!(SceneCommand::ExportLevel.can_do(&registry));
    }
}
