/// Extension classification for sorting files into category folders.
///
/// A [`TypeGroups`] table maps category names (e.g. `"IMAGE"`) to sets of upper-case
/// extension tokens. The [`Classifier`] answers the two questions the engine asks of it:
/// which category an extension belongs to, and whether a folder name looks like one the
/// sorter created on an earlier run.
///
/// # Examples
///
/// ```
/// use dirsort::file_category::Classifier;
///
/// let classifier = Classifier::default();
/// assert_eq!(classifier.classify("jpg"), "IMAGE");
/// assert_eq!(classifier.classify("JPG"), "IMAGE");
/// assert_eq!(classifier.classify("nope"), "UNDEFINED");
/// ```
use std::collections::{BTreeSet, HashSet};

/// Category assigned to extensions that appear in no group.
pub const UNDEFINED_CATEGORY: &str = "UNDEFINED";

/// Extension assigned to files whose name has no extension.
pub const UNDEFINED_EXTENSION: &str = "undefined";

/// Destination segment for folders that are not sorter-managed.
pub const FOLDERS_SEGMENT: &str = "FOLDERS";

/// Ordered table of categories and their member extensions.
///
/// Insertion order matters: when an extension is listed under several categories,
/// the first category wins.
#[derive(Debug, Clone, Default)]
pub struct TypeGroups {
    groups: Vec<(String, BTreeSet<String>)>,
    type_list: HashSet<String>,
}

impl TypeGroups {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the table shipped with dirsort.
    pub fn standard() -> Self {
        let mut groups = Self::new();

        groups.add_extensions(
            "IMAGE",
            &[
                "png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "tiff", "tif", "ico", "heic",
                "psd", "raw",
            ],
        );
        groups.add_extensions(
            "AUDIO",
            &["mp3", "wav", "ogg", "flac", "aac", "m4a", "wma", "aiff", "mid"],
        );
        groups.add_extensions(
            "VIDEO",
            &["mp4", "mkv", "avi", "mov", "flv", "wmv", "webm", "3gp", "mpeg", "mpg", "m4v"],
        );
        groups.add_extensions(
            "DOCUMENT",
            &["pdf", "txt", "doc", "docx", "md", "rtf", "odt", "tex", "epub", "djvu"],
        );
        groups.add_extensions(
            "ARCHIVE",
            &["zip", "rar", "7z", "tar", "gz", "bz2", "xz", "tgz", "iso", "dmg"],
        );
        groups.add_extensions(
            "CODE",
            &[
                "py", "java", "c", "cpp", "h", "hpp", "js", "ts", "rs", "go", "sh", "bash", "rb",
                "php", "html", "htm", "css", "json", "xml", "yaml", "yml", "toml", "sql",
            ],
        );
        groups.add_extensions("SPREADSHEET", &["csv", "xls", "xlsx", "ods"]);
        groups.add_extensions("PRESENTATION", &["ppt", "pptx", "odp", "key"]);
        groups.add_extensions("FONT", &["ttf", "otf", "woff", "woff2", "fon"]);
        groups.add_extensions("EXECUTABLE", &["exe", "msi", "deb", "rpm", "apk", "bin", "app"]);

        groups
    }

    /// Adds one extension to a category, creating the category if needed.
    pub fn add_extension(&mut self, category: &str, extension: &str) {
        let token = extension.trim_start_matches('.').to_uppercase();
        if token.is_empty() {
            return;
        }

        match self.groups.iter_mut().find(|(name, _)| name == category) {
            Some((_, members)) => {
                members.insert(token.clone());
            }
            None => {
                self.groups
                    .push((category.to_string(), BTreeSet::from([token.clone()])));
            }
        }
        self.type_list.insert(token);
    }

    /// Adds several extensions to a category.
    pub fn add_extensions(&mut self, category: &str, extensions: &[&str]) {
        for extension in extensions {
            self.add_extension(category, extension);
        }
    }

    /// Category names in table order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    /// Returns true if `name` is a category of this table (case-sensitive).
    pub fn contains_category(&self, name: &str) -> bool {
        self.groups.iter().any(|(category, _)| category == name)
    }

    /// Returns true if the upper-case `token` belongs to any category.
    pub fn contains_extension(&self, token: &str) -> bool {
        self.type_list.contains(token)
    }

    /// Returns the first category whose member set contains the upper-case `token`.
    pub fn category_of(&self, token: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, members)| members.contains(token))
            .map(|(name, _)| name.as_str())
    }
}

/// Maps extensions to categories and recognizes sorter-managed folder names.
#[derive(Debug, Clone)]
pub struct Classifier {
    groups: TypeGroups,
}

impl Classifier {
    /// Creates a classifier over the given table.
    pub fn new(groups: TypeGroups) -> Self {
        Self { groups }
    }

    /// The table this classifier reads from.
    pub fn groups(&self) -> &TypeGroups {
        &self.groups
    }

    /// Returns the category of `extension`, or [`UNDEFINED_CATEGORY`].
    ///
    /// The lookup is case-insensitive.
    pub fn classify(&self, extension: &str) -> &str {
        self.category_for_extension(extension)
            .unwrap_or(UNDEFINED_CATEGORY)
    }

    /// Returns the category owning `extension`, if any.
    pub fn category_for_extension(&self, extension: &str) -> Option<&str> {
        if extension.is_empty() {
            return None;
        }
        self.groups.category_of(&extension.to_uppercase())
    }

    /// Returns true if `name` is a category folder name, including [`UNDEFINED_CATEGORY`].
    pub fn is_category(&self, name: &str) -> bool {
        name == UNDEFINED_CATEGORY || self.groups.contains_category(name)
    }

    /// Returns true if a folder called `name` was plausibly created by a previous run.
    ///
    /// Extension tokens and the reserved `FOLDERS`/`UNDEFINED` segments match
    /// case-insensitively; category names must match exactly.
    pub fn is_sorter_managed_name(&self, name: &str) -> bool {
        let upper = name.to_uppercase();
        self.groups.contains_extension(&upper)
            || upper == FOLDERS_SEGMENT
            || upper == UNDEFINED_CATEGORY
            || self.groups.contains_category(name)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(TypeGroups::standard())
    }
}
