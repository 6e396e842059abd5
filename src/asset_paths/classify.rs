use std::fmt;

/// Semantic kind of an emitted file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// `.js`
    Script,
    /// `.css`
    Stylesheet,
    /// `.js.map`
    ScriptMap,
    /// `.css.map`
    StylesheetMap,
    /// Anything else.
    Other,
}

impl AssetKind {
    /// Key used for this kind inside an entry of the serialised manifest.
    ///
    /// [`AssetKind::Other`] has no fixed key; callers that opt into other kinds key them by
    /// extension instead (see [`other_extension`]).
    pub fn manifest_key(self) -> Option<&'static str> {
        match self {
            AssetKind::Script => Some("js"),
            AssetKind::ScriptMap => Some("jsSourceMap"),
            AssetKind::Stylesheet => Some("css"),
            AssetKind::StylesheetMap => Some("cssSourceMap"),
            AssetKind::Other => None,
        }
    }

    /// Whether the kind is always recorded in the manifest.
    pub fn is_tracked(self) -> bool {
        self != AssetKind::Other
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_key().unwrap_or("other"))
    }
}

/// Drop everything from the first `?` onwards.
pub fn strip_query(path: &str) -> &str {
    path.split_once('?').map_or(path, |(bare, _)| bare)
}

/// Classify an emitted path by its extension, ignoring any query string.
///
/// Source maps are checked before their base kinds so `app.js.map` never reads as a script.
pub fn classify(path: &str) -> AssetKind {
    let bare = strip_query(path).to_ascii_lowercase();

    if bare.ends_with(".js.map") {
        AssetKind::ScriptMap
    } else if bare.ends_with(".css.map") {
        AssetKind::StylesheetMap
    } else if bare.ends_with(".js") {
        AssetKind::Script
    } else if bare.ends_with(".css") {
        AssetKind::Stylesheet
    } else {
        AssetKind::Other
    }
}

/// Lowercase extension of the file name in `path`, query string excluded.
pub fn other_extension(path: &str) -> Option<String> {
    let bare = strip_query(path);
    let file_name = bare.rsplit(['/', '\\']).next().unwrap_or(bare);
    let (stem, extension) = file_name.rsplit_once('.')?;

    if stem.is_empty() || extension.is_empty() {
        return None;
    }

    Some(extension.to_ascii_lowercase())
}
