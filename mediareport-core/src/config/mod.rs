//! Export configuration: where artifacts land and how they are named.
//!
//! Every format reads its file name from [`ExportConfig`], so a caller can
//! rename any artifact without touching the serializers.

mod builder;

use std::path::PathBuf;

pub use builder::ExportConfigBuilder;

// Default constants

/// Directory receiving the exported files.
pub const DEFAULT_EXPORT_DIRECTORY: &str = ".";

/// HTML report file name.
pub const DEFAULT_HTML_REPORT_FILE_NAME: &str = "report.html";

/// JSON report file name.
pub const DEFAULT_JSON_REPORT_FILE_NAME: &str = "report.json";

/// Table document file names, one per structured format.
pub const DEFAULT_JSON_TABLE_FILE_NAME: &str = "media-datas.json";
pub const DEFAULT_XML_TABLE_FILE_NAME: &str = "media-datas.xml";
pub const DEFAULT_XLSX_TABLE_FILE_NAME: &str = "media-datas.xlsx";
pub const DEFAULT_SQLITE_TABLE_FILE_NAME: &str = "media-datas.sqlite";
pub const DEFAULT_ODS_TABLE_FILE_NAME: &str = "media-datas.ods";

/// Raw prober output, written as received.
pub const DEFAULT_FFPROBE_XML_FILE_NAME: &str = "ffprobe.xml";

/// Name given to the most representative frame of the media.
pub const DEFAULT_SIGNIFICANT_SNAPSHOT_FILE_NAME: &str = "significant-snapshot.jpg";

/// Strip images are named `<prefix>-<n>.<ext>`.
pub const DEFAULT_SNAPSHOT_STRIP_PREFIX: &str = "snapshot-strip";

/// Export settings shared by every format.
///
/// # Examples
///
/// ```rust
/// use mediareport_core::config::ExportConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ExportConfigBuilder::new()
///     .export_directory(PathBuf::from("/tmp/reports"))
///     .base_file_name("take-1")
///     .batch_mode(true)
///     .build();
/// assert!(config.batch_mode);
/// ```
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Created on first write if missing.
    pub export_directory: PathBuf,

    /// Optional name placed before every produced suffix.
    pub base_file_name: Option<String>,

    /// Keep the source extension in the batch prefix.
    pub add_source_ext: bool,

    /// Prefix every file with the source name, so several sources can
    /// share one export directory.
    pub batch_mode: bool,

    pub html_report_file_name: String,
    pub json_report_file_name: String,
    pub json_table_file_name: String,
    pub xml_table_file_name: String,
    pub xlsx_table_file_name: String,
    pub sqlite_table_file_name: String,
    pub ods_table_file_name: String,
    pub ffprobe_xml_file_name: String,
    pub significant_snapshot_file_name: String,
    pub snapshot_strip_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_directory: PathBuf::from(DEFAULT_EXPORT_DIRECTORY),
            base_file_name: None,
            add_source_ext: false,
            batch_mode: false,
            html_report_file_name: DEFAULT_HTML_REPORT_FILE_NAME.to_string(),
            json_report_file_name: DEFAULT_JSON_REPORT_FILE_NAME.to_string(),
            json_table_file_name: DEFAULT_JSON_TABLE_FILE_NAME.to_string(),
            xml_table_file_name: DEFAULT_XML_TABLE_FILE_NAME.to_string(),
            xlsx_table_file_name: DEFAULT_XLSX_TABLE_FILE_NAME.to_string(),
            sqlite_table_file_name: DEFAULT_SQLITE_TABLE_FILE_NAME.to_string(),
            ods_table_file_name: DEFAULT_ODS_TABLE_FILE_NAME.to_string(),
            ffprobe_xml_file_name: DEFAULT_FFPROBE_XML_FILE_NAME.to_string(),
            significant_snapshot_file_name: DEFAULT_SIGNIFICANT_SNAPSHOT_FILE_NAME.to_string(),
            snapshot_strip_prefix: DEFAULT_SNAPSHOT_STRIP_PREFIX.to_string(),
        }
    }
}

impl ExportConfig {
    /// Same settings, batch prefixing turned on.
    #[must_use]
    pub fn for_batch(&self) -> Self {
        Self {
            batch_mode: true,
            ..self.clone()
        }
    }
}
