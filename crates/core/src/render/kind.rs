use std::fmt;

use super::RenderError;

/// A representation a response can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Html,
    Atom,
    Ics,
    Kml,
    Xml,
    Json,
}

impl OutputKind {
    /// Maps a path extension or `format` value to a kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(OutputKind::Html),
            "atom" => Some(OutputKind::Atom),
            "ics" | "ical" => Some(OutputKind::Ics),
            "kml" => Some(OutputKind::Kml),
            "xml" => Some(OutputKind::Xml),
            "json" | "js" => Some(OutputKind::Json),
            _ => None,
        }
    }

    /// Maps a media type from an `Accept` header to a kind.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "text/html" | "application/xhtml+xml" | "text/*" => Some(OutputKind::Html),
            "application/atom+xml" => Some(OutputKind::Atom),
            "text/calendar" => Some(OutputKind::Ics),
            "application/vnd.google-earth.kml+xml" => Some(OutputKind::Kml),
            "application/xml" | "text/xml" => Some(OutputKind::Xml),
            "application/json" | "text/javascript" | "application/javascript" => {
                Some(OutputKind::Json)
            }
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputKind::Html => "html",
            OutputKind::Atom => "atom",
            OutputKind::Ics => "ics",
            OutputKind::Kml => "kml",
            OutputKind::Xml => "xml",
            OutputKind::Json => "json",
        }
    }

    /// The `Content-Type` header value for this kind.
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputKind::Html => "text/html; charset=utf-8",
            OutputKind::Atom => "application/atom+xml; charset=utf-8",
            OutputKind::Ics => "text/calendar; charset=utf-8",
            OutputKind::Kml => "application/vnd.google-earth.kml+xml; charset=utf-8",
            OutputKind::Xml => "application/xml; charset=utf-8",
            OutputKind::Json => "application/json",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// What is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// A list of events: index or search results.
    Listing,
    /// A single event.
    Event,
}

impl Resource {
    /// Kinds this resource can be rendered as, in preference order.
    pub fn supported(&self) -> &'static [OutputKind] {
        match self {
            Resource::Listing => &[
                OutputKind::Html,
                OutputKind::Atom,
                OutputKind::Ics,
                OutputKind::Kml,
                OutputKind::Xml,
                OutputKind::Json,
            ],
            Resource::Event => &[
                OutputKind::Html,
                OutputKind::Xml,
                OutputKind::Json,
                OutputKind::Ics,
            ],
        }
    }

    pub fn supports(&self, kind: OutputKind) -> bool {
        self.supported().contains(&kind)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resource::Listing => "event listings",
            Resource::Event => "a single event",
        })
    }
}

/// Fails with [`RenderError::NotAcceptable`] unless `resource` supports `kind`.
pub fn ensure_supported(resource: Resource, kind: OutputKind) -> Result<OutputKind, RenderError> {
    if resource.supports(kind) {
        Ok(kind)
    } else {
        Err(RenderError::NotAcceptable { kind, resource })
    }
}

/// Media ranges from an `Accept` header, best first. Ranges with `q=0` are dropped.
fn media_ranges(accept: &str) -> Vec<&str> {
    let mut ranges: Vec<(&str, f32)> = accept
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let mime = pieces.next()?.trim();
            if mime.is_empty() {
                return None;
            }
            let quality = pieces
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (quality > 0.0).then_some((mime, quality))
        })
        .collect();

    ranges.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranges.into_iter().map(|(mime, _)| mime).collect()
}

/// Picks the output kind for a request.
///
/// A path extension beats the `format` parameter, which beats the `Accept`
/// header. No header, or one accepting anything, means HTML.
pub fn negotiate(
    resource: Resource,
    extension: Option<&str>,
    format: Option<&str>,
    accept: Option<&str>,
) -> Result<OutputKind, RenderError> {
    let explicit = extension
        .filter(|e| !e.trim().is_empty())
        .or_else(|| format.filter(|f| !f.trim().is_empty()));

    if let Some(requested) = explicit {
        let kind = OutputKind::from_extension(requested)
            .ok_or_else(|| RenderError::UnsupportedFormat(requested.trim().to_string()))?;
        return ensure_supported(resource, kind);
    }

    let Some(accept) = accept.filter(|a| !a.trim().is_empty()) else {
        return Ok(OutputKind::Html);
    };

    for mime in media_ranges(accept) {
        if mime == "*/*" {
            return Ok(OutputKind::Html);
        }
        if let Some(kind) = OutputKind::from_mime(mime).filter(|k| resource.supports(*k)) {
            return Ok(kind);
        }
    }

    Err(RenderError::UnsupportedFormat(accept.trim().to_string()))
}
