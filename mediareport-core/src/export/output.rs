//! Output file naming shared by every format.

use std::fs;
use std::path::{Path, PathBuf};

use log::trace;

use crate::config::ExportConfig;
use crate::error::{CoreResult, ExportContext};

/// Characters ending a base name that already separate it from the suffix.
const BASE_NAME_SEPARATORS: [char; 4] = ['_', ' ', '-', '|'];

/// Builds `<batch prefix><base name><suffix>` paths inside the export
/// directory for one source.
#[derive(Debug, Clone)]
pub struct OutputNaming {
    directory: PathBuf,
    prefix: String,
}

impl OutputNaming {
    pub fn new(config: &ExportConfig, source: &str) -> Self {
        let mut prefix = String::new();
        if config.batch_mode {
            prefix.push_str(&batch_prefix(source, config.add_source_ext));
            prefix.push('_');
        }
        if let Some(base) = config.base_file_name.as_deref().filter(|b| !b.is_empty()) {
            prefix.push_str(base);
            if !base.ends_with(BASE_NAME_SEPARATORS) {
                prefix.push('_');
            }
        }
        Self {
            directory: config.export_directory.clone(),
            prefix,
        }
    }

    /// File name only, without the directory.
    pub fn file_name(&self, suffix: &str) -> String {
        format!("{}{}", self.prefix, suffix)
    }

    /// Full path for `suffix`. The export directory is created if missing.
    pub fn make_output_file(&self, suffix: &str) -> CoreResult<PathBuf> {
        let path = self.directory.join(self.file_name(suffix));
        if !self.directory.is_dir() {
            fs::create_dir_all(&self.directory).export_context(&path)?;
        }
        trace!("Make output file name: {}", path.display());
        Ok(path)
    }
}

fn batch_prefix(source: &str, add_source_ext: bool) -> String {
    let path = Path::new(source);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source)
        .to_string();
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if add_source_ext && !ext.is_empty() => format!("{stem}.{ext}"),
        _ => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfigBuilder;
    use crate::error::CoreError;

    fn naming(base: Option<&str>, batch: bool, add_ext: bool) -> OutputNaming {
        let mut builder = ExportConfigBuilder::new()
            .export_directory(PathBuf::from("/out"))
            .batch_mode(batch)
            .add_source_ext(add_ext);
        if let Some(base) = base {
            builder = builder.base_file_name(base);
        }
        OutputNaming::new(&builder.build(), "/media/clip.mkv")
    }

    #[test]
    fn plain_suffix() {
        assert_eq!(naming(None, false, false).file_name("report.html"), "report.html");
    }

    #[test]
    fn base_name_separator() {
        assert_eq!(naming(Some("run"), false, false).file_name("events.txt"), "run_events.txt");
        assert_eq!(naming(Some("run-"), false, false).file_name("events.txt"), "run-events.txt");
        assert_eq!(naming(Some("run "), false, false).file_name("events.txt"), "run events.txt");
        assert_eq!(naming(Some("run|"), false, false).file_name("events.txt"), "run|events.txt");
    }

    #[test]
    fn batch_prefix_with_and_without_ext() {
        assert_eq!(naming(None, true, false).file_name("about.txt"), "clip_about.txt");
        assert_eq!(naming(Some("run"), true, true).file_name("about.txt"), "clip.mkv_run_about.txt");
    }

    #[test]
    fn directory_is_created() {
        let temp = tempfile::tempdir().unwrap();
        let directory = temp.path().join("a").join("b");
        let config = ExportConfigBuilder::new().export_directory(directory.clone()).build();
        let path = OutputNaming::new(&config, "clip.mkv")
            .make_output_file("report.json")
            .unwrap();
        assert!(directory.is_dir());
        assert_eq!(path, directory.join("report.json"));
    }

    #[test]
    fn blocked_directory_is_an_export_failure() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("file");
        fs::write(&file, b"").unwrap();
        let config = ExportConfigBuilder::new().export_directory(file.join("sub")).build();

        let err = OutputNaming::new(&config, "clip.mkv")
            .make_output_file("report.json")
            .unwrap_err();
        match err {
            CoreError::Export { path, source } => {
                assert_eq!(path, file.join("sub").join("report.json"));
                assert!(source.downcast_ref::<std::io::Error>().is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
