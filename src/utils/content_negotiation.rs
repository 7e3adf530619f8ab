use axum::http::{header::ACCEPT, HeaderMap};

use crate::services::graphviz::GraphFormat;
use crate::services::permalink::Representation;
use crate::services::rdf::RdfFormat;

/// Media types the permalink route produces, in preference order for
/// wildcard ranges.
pub const PRODUCES: &[(&str, Representation)] = &[
    ("text/html", Representation::Viewer),
    ("application/json", Representation::Viewer),
    ("application/x-yaml", Representation::Raw),
    ("application/octet-stream", Representation::Raw),
    ("text/turtle", Representation::Rdf(RdfFormat::Turtle)),
    ("application/ld+json", Representation::Rdf(RdfFormat::JsonLd)),
    ("application/rdf+xml", Representation::Rdf(RdfFormat::RdfXml)),
    ("image/svg+xml", Representation::Graph(GraphFormat::Svg)),
    ("image/png", Representation::Graph(GraphFormat::Png)),
    ("text/vnd+graphviz", Representation::Graph(GraphFormat::Xdot)),
    ("application/vnd.wf4ever.robundle+zip", Representation::Bundle),
    ("application/zip", Representation::Bundle),
];

#[derive(Debug, Clone, PartialEq)]
struct MediaRange {
    media_type: String,
    quality: f32,
}

fn parse_accept(value: &str) -> Vec<MediaRange> {
    value
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let media_type = pieces.next()?.trim().to_ascii_lowercase();
            if media_type.is_empty() {
                return None;
            }
            let quality = pieces
                .filter_map(|param| param.split_once('='))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
                .and_then(|(_, q)| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            Some(MediaRange {
                media_type,
                quality,
            })
        })
        .collect()
}

impl MediaRange {
    /// `*/*` < `type/*` < `type/subtype`.
    fn specificity(&self) -> u8 {
        match self.media_type.as_str() {
            "*/*" | "*" => 0,
            t if t.ends_with("/*") => 1,
            _ => 2,
        }
    }
}

fn resolve_range(media_type: &str) -> Option<Representation> {
    if media_type == "*/*" || media_type == "*" {
        return Some(Representation::Raw);
    }
    if let Some(top) = media_type.strip_suffix("/*") {
        return PRODUCES
            .iter()
            .find(|(produced, _)| produced.split('/').next() == Some(top))
            .map(|(_, repr)| *repr);
    }
    PRODUCES
        .iter()
        .find(|(produced, _)| *produced == media_type)
        .map(|(_, repr)| *repr)
}

/// Pick the representation for a request from its `Accept` headers.
/// No `Accept` header accepts anything.
pub fn negotiate(headers: &HeaderMap) -> Option<Representation> {
    let joined = headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join(",");

    let mut ranges = parse_accept(&joined);
    if ranges.is_empty() {
        return Some(Representation::Raw);
    }

    ranges.retain(|range| range.quality > 0.0);
    // stable: equally specific ranges of equal quality keep header order
    ranges.sort_by(|a, b| {
        b.quality
            .total_cmp(&a.quality)
            .then_with(|| b.specificity().cmp(&a.specificity()))
    });

    ranges
        .iter()
        .find_map(|range| resolve_range(&range.media_type))
}
