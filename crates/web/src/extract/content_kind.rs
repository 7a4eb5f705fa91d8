/// How a request body should be decoded, derived from its `Content-Type`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContentKind {
    Json,
    Form,
    Other,
}

impl ContentKind {
    /// Picks the decoding for a declared content type.
    ///
    /// The match is a case-insensitive substring search: any type mentioning
    /// `json` decodes as JSON, any type mentioning `x-www-form-urlencoded` decodes
    /// as a form. A stricter media type parser can replace this function without
    /// touching its callers.
    pub fn detect(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return ContentKind::Other;
        };

        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("json") {
            ContentKind::Json
        } else if content_type.contains("x-www-form-urlencoded") {
            ContentKind::Form
        } else {
            ContentKind::Other
        }
    }
}
