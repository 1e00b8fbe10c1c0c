use anyhow::{Result, Context};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Prefix of in-progress output files
const TEMP_PREFIX: &str = ".subtrans-";

/// Creation mode for new outputs, narrowed by the umask like `fs::write`
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o666;

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Output path next to (or under output_dir for) the input
    // @params: input_file, output_dir, suffix appended to the stem, extension (none when empty)
    pub fn generate_output_path<P1: AsRef<Path>>(
        input_file: P1,
        output_dir: Option<&Path>,
        suffix: &str,
        extension: &str,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push_str(suffix);
        let extension = extension.trim_start_matches('.');
        if !extension.is_empty() {
            output_filename.push('.');
            output_filename.push_str(extension);
        }

        let dir = output_dir
            .map(Path::to_path_buf)
            .or_else(|| input_file.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        dir.join(output_filename)
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let wanted = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if !path.is_file() || Self::is_temp_file(path) {
                continue;
            }
            if path.extension().is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted)) {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file through a temporary sibling, renamed on success.
    ///
    /// Readers never observe a half-written file, and a failed write leaves
    /// whatever was at `path` before untouched.
    pub fn write_atomically<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        let mut temp = Self::sibling_temp_file(path)?;

        temp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to file: {:?}", temp.path()))?;
        temp.as_file().sync_all()
            .with_context(|| format!("Failed to flush file: {:?}", temp.path()))?;

        temp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to move output into place: {:?}", path))?;
        Ok(())
    }

    /// Create an empty temporary file in the directory of `path`, with the same extension.
    ///
    /// On Unix the file gets the permissions of an existing `path`, otherwise
    /// the mode a plain `fs::write` would give it. The file is removed when
    /// dropped unless persisted.
    pub fn sibling_temp_file<P: AsRef<Path>>(path: P) -> Result<NamedTempFile> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&parent)?;

        // Keep the extension so tools that infer formats from it still work
        let suffix = path.extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut builder = Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(&suffix);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(NEW_FILE_MODE));
        }

        let temp = builder.tempfile_in(&parent)
            .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;

        // The umask applies at creation; an existing file's mode is copied as-is
        #[cfg(unix)]
        {
            if let Ok(existing) = fs::metadata(path) {
                temp.as_file().set_permissions(existing.permissions())
                    .with_context(|| format!("Failed to set permissions on {:?}", temp.path()))?;
            }
        }

        Ok(temp)
    }

    fn is_temp_file(path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with(TEMP_PREFIX))
    }

    /// Detect whether a file is a WebVTT caption file, an SRT file or a video
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy().to_lowercase();

            match ext_str.as_str() {
                "vtt" => return Ok(FileType::Captions),
                "srt" => return Ok(FileType::Subtitle),
                _ => {}
            }

            // Common video containers ffmpeg can read
            let video_extensions = [
                "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v",
                "mpg", "mpeg", "ogv", "ts", "mts", "m2ts"
            ];

            if video_extensions.contains(&ext_str.as_str()) {
                return Ok(FileType::Video);
            }
        }

        // Fall back to examining file contents
        if let Ok(content) = fs::read_to_string(path) {
            let first_line = content.trim_start_matches('\u{feff}').lines().next().unwrap_or("");
            if first_line.trim_start().starts_with("WEBVTT") {
                return Ok(FileType::Captions);
            }
            if content.contains("-->") {
                return Ok(FileType::Subtitle);
            }
        }

        Ok(FileType::Unknown)
    }
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// WebVTT caption file (pipeline input)
    Captions,
    /// SRT subtitle file
    Subtitle,
    /// Video file supported by ffmpeg
    Video,
    /// Unknown file type
    Unknown,
}
