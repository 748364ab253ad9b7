//! File System Path Utilities
//!
//! Parses drive-qualified paths into a drive number and a list of name
//! segments.
//!
//! # Path Format
//! - `0:/readme.txt` - file in the root of disk 0
//! - `1:/docs/notes.txt` - nested path on disk 1
//!
//! Repeated separators are collapsed. `.` segments are dropped and `..`
//! removes the previous segment, so drivers only ever see plain names.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use super::vfs::{FsResult, FsStatus};

/// Maximum path length
pub const MAX_PATH: usize = 108;

/// Path separator character
pub const PATH_SEPARATOR: char = '/';

/// Path component (a single directory or file name)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathComponent {
    name: String,
}

impl PathComponent {
    /// Create from string slice
    pub fn new_from(s: &str) -> FsResult<Self> {
        let mut name = String::new();
        name.try_reserve_exact(s.len())
            .map_err(|_| FsStatus::OutOfMemory)?;
        name.push_str(s);
        Ok(Self { name })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for PathComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Parsed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    /// Drive number (the leading digit)
    pub drive: usize,
    components: Vec<PathComponent>,
}

impl ParsedPath {
    /// Parse a path string, bounded by [`MAX_PATH`].
    pub fn parse(path: &str) -> FsResult<Self> {
        Self::parse_with_limit(path, MAX_PATH)
    }

    /// Parse a path string no longer than `max_len` bytes.
    ///
    /// The path must start with `<digit>:/`. Anything else is
    /// [`FsStatus::InvalidArgument`].
    pub fn parse_with_limit(path: &str, max_len: usize) -> FsResult<Self> {
        if path.len() > max_len {
            return Err(FsStatus::InvalidArgument);
        }

        let bytes = path.as_bytes();
        if bytes.len() < 3 || !bytes[0].is_ascii_digit() || &bytes[1..3] != b":/" {
            return Err(FsStatus::InvalidArgument);
        }
        let drive = (bytes[0] - b'0') as usize;

        let mut components: Vec<PathComponent> = Vec::new();
        for component in path[3..].split(PATH_SEPARATOR) {
            if component.is_empty() || component == "." {
                continue;
            }

            if component == ".." {
                components.pop();
                continue;
            }

            components
                .try_reserve(1)
                .map_err(|_| FsStatus::OutOfMemory)?;
            components.push(PathComponent::new_from(component)?);
        }

        Ok(Self { drive, components })
    }

    /// Whether the path names the root directory itself.
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    /// Final component (the file name)
    pub fn file_name(&self) -> Option<&str> {
        self.components.last().map(PathComponent::as_str)
    }

    pub fn depth(&self) -> usize {
        self.components.len()
    }
}

impl fmt::Display for ParsedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.drive)?;
        if self.components.is_empty() {
            return f.write_str("/");
        }
        for component in &self.components {
            write!(f, "/{}", component)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(path: &ParsedPath) -> Vec<&str> {
        path.components().iter().map(PathComponent::as_str).collect()
    }

    #[test]
    fn parses_drive_and_segments() {
        let path = ParsedPath::parse("1:/docs/notes.txt").unwrap();
        assert_eq!(path.drive, 1);
        assert_eq!(names(&path), ["docs", "notes.txt"]);
        assert_eq!(path.file_name(), Some("notes.txt"));
        assert_eq!(path.depth(), 2);
    }

    #[test]
    fn root_has_no_segments() {
        let path = ParsedPath::parse("0:/").unwrap();
        assert!(path.is_root());
        assert_eq!(path.file_name(), None);
        assert_eq!(path.to_string(), "0:/");
    }

    #[test]
    fn empty_segments_are_ignored() {
        let path = ParsedPath::parse("0://a///b/").unwrap();
        assert_eq!(names(&path), ["a", "b"]);
        assert_eq!(path.to_string(), "0:/a/b");
    }

    #[test]
    fn dot_segments_are_normalized() {
        let path = ParsedPath::parse("0:/a/./b/../c").unwrap();
        assert_eq!(names(&path), ["a", "c"]);
        let above_root = ParsedPath::parse("0:/../x").unwrap();
        assert_eq!(names(&above_root), ["x"]);
    }

    #[test]
    fn rejects_malformed_prefixes() {
        for bad in ["", "0", "0:", "a:/x", "0/x", "0:x", "/x", "00:/x"] {
            assert_eq!(ParsedPath::parse(bad), Err(FsStatus::InvalidArgument), "{bad}");
        }
    }

    #[test]
    fn rejects_overlong_paths() {
        let long = alloc::format!("0:/{}", "a".repeat(MAX_PATH));
        assert_eq!(ParsedPath::parse(&long), Err(FsStatus::InvalidArgument));
        assert!(ParsedPath::parse_with_limit("0:/abc", 6).is_ok());
        assert_eq!(
            ParsedPath::parse_with_limit("0:/abcd", 6),
            Err(FsStatus::InvalidArgument)
        );
    }
}
