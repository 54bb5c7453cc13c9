//! Radial layout of the emotion distribution and its SVG rendering.

use std::f64::consts::PI;
use std::fmt::Write;

use serde::Serialize;

use crate::model::{DiaryEntry, EmotionalInsights};
use crate::tagging::{emotion_color, entry_emotion};

pub const VIEW_WIDTH: f64 = 800.0;
pub const VIEW_HEIGHT: f64 = 500.0;
pub const CENTER_X: f64 = 400.0;
pub const CENTER_Y: f64 = 250.0;
pub const RADIUS: f64 = 180.0;
pub const MIN_NODE_SIZE: f64 = 40.0;
pub const MAX_NODE_SIZE: f64 = 120.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionNode {
    pub emotion: String,
    pub count: u64,
    pub x: f64,
    pub y: f64,
    /// Diameter.
    pub size: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmotionLayout {
    pub nodes: Vec<EmotionNode>,
    pub max_count: u64,
}

impl EmotionLayout {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, emotion: &str) -> Option<&EmotionNode> {
        self.nodes.iter().find(|n| n.emotion == emotion)
    }
}

pub fn node_size(count: u64, max_count: u64) -> f64 {
    if max_count == 0 {
        return MIN_NODE_SIZE;
    }
    MIN_NODE_SIZE + (count as f64 / max_count as f64) * (MAX_NODE_SIZE - MIN_NODE_SIZE)
}

/// Place one node per emotion evenly around the center, starting at angle 0
/// (to the right) and going clockwise in screen coordinates, in the
/// distribution's key order.
pub fn layout(insights: &EmotionalInsights) -> EmotionLayout {
    let dist = &insights.emotion_distribution;
    if dist.is_empty() {
        return EmotionLayout::default();
    }
    let max_count = insights.max_count();
    let n = dist.len() as f64;

    let nodes = dist
        .iter()
        .enumerate()
        .map(|(i, (emotion, &count))| {
            let angle = (i as f64 / n) * 2.0 * PI;
            EmotionNode {
                emotion: emotion.clone(),
                count,
                x: CENTER_X + RADIUS * angle.cos(),
                y: CENTER_Y + RADIUS * angle.sin(),
                size: node_size(count, max_count),
                color: emotion_color(emotion),
            }
        })
        .collect();

    EmotionLayout { nodes, max_count }
}

/// Entries whose emotion label contains `emotion`, case-insensitively.
pub fn related_entries<'a>(entries: &'a [DiaryEntry], emotion: &str) -> Vec<&'a DiaryEntry> {
    let needle = emotion.to_lowercase();
    entries
        .iter()
        .filter(|e| {
            entry_emotion(e)
                .map(|label| label.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .collect()
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Standalone SVG document for the layout. While `selected` is set, the
/// other nodes are dimmed and the selected spoke is fully opaque.
pub fn render_svg(layout: &EmotionLayout, selected: Option<&str>) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{VIEW_WIDTH}" height="{VIEW_HEIGHT}" viewBox="0 0 {VIEW_WIDTH} {VIEW_HEIGHT}">"#
    );
    let _ = writeln!(
        svg,
        r#"  <defs><radialGradient id="emotionGlow" cx="50%" cy="50%" r="50%"><stop offset="0%" stop-color="rgba(255,255,255,0.8)"/><stop offset="100%" stop-color="rgba(255,255,255,0.1)"/></radialGradient></defs>"#
    );
    let _ = writeln!(
        svg,
        r##"  <rect width="100%" height="100%" fill="#2d2a4a"/>"##
    );

    for node in &layout.nodes {
        let is_selected = selected == Some(node.emotion.as_str());
        let line_opacity = if is_selected { 1.0 } else { 0.3 };
        let node_opacity = match selected {
            Some(s) if s != node.emotion => 0.5,
            _ => 1.0,
        };
        let label = escape(&node.emotion);
        let r = node.size / 2.0;

        let _ = writeln!(svg, r#"  <g data-emotion="{label}">"#);
        let _ = writeln!(
            svg,
            r#"    <line x1="{CENTER_X}" y1="{CENTER_Y}" x2="{:.2}" y2="{:.2}" stroke="rgba(255,255,255,0.2)" stroke-width="2" opacity="{line_opacity}"/>"#,
            node.x, node.y
        );
        let _ = writeln!(
            svg,
            r#"    <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" stroke="rgba(255,255,255,0.5)" stroke-width="2" opacity="{node_opacity}"/>"#,
            node.x, node.y, r, node.color
        );
        let _ = writeln!(
            svg,
            r#"    <text x="{:.2}" y="{:.2}" text-anchor="middle" fill="white" font-size="14" font-weight="600">{label}</text>"#,
            node.x,
            node.y + r + 20.0
        );
        let _ = writeln!(
            svg,
            r#"    <text x="{:.2}" y="{:.2}" text-anchor="middle" fill="rgba(255,255,255,0.7)" font-size="12">{} entries</text>"#,
            node.x,
            node.y + r + 35.0,
            node.count
        );
        let _ = writeln!(svg, "  </g>");
    }

    let _ = writeln!(
        svg,
        r#"  <circle cx="{CENTER_X}" cy="{CENTER_Y}" r="30" fill="url(#emotionGlow)" stroke="rgba(255,255,255,0.8)" stroke-width="3"/>"#
    );
    let _ = writeln!(
        svg,
        r##"  <text x="{CENTER_X}" y="{}" text-anchor="middle" fill="#333" font-size="14" font-weight="700">You</text>"##,
        CENTER_Y + 5.0
    );
    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn insights(pairs: &[(&str, u64)]) -> EmotionalInsights {
        EmotionalInsights {
            total_entries: pairs.iter().map(|(_, c)| c).sum(),
            emotion_distribution: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
            most_common_emotions: Vec::new(),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_distribution_has_no_nodes() {
        let l = layout(&EmotionalInsights::default());
        assert!(l.is_empty());
        let svg = render_svg(&l, None);
        assert!(svg.contains("You"));
        assert!(!svg.contains("entries<"));
    }

    #[test]
    fn test_single_node_to_the_right() {
        let l = layout(&insights(&[("joy", 4)]));
        let n = &l.nodes[0];
        assert!(close(n.x, 580.0));
        assert!(close(n.y, 250.0));
        assert!(close(n.size, 120.0));
    }

    #[test]
    fn test_four_nodes_quarter_turns() {
        let l = layout(&insights(&[("anxious", 1), ("calm", 2), ("joy", 4), ("sad", 2)]));
        let names: Vec<&str> = l.nodes.iter().map(|n| n.emotion.as_str()).collect();
        assert_eq!(names, vec!["anxious", "calm", "joy", "sad"]);

        assert!(close(l.nodes[0].x, 580.0) && close(l.nodes[0].y, 250.0));
        assert!(close(l.nodes[1].x, 400.0) && close(l.nodes[1].y, 430.0));
        assert!(close(l.nodes[2].x, 220.0) && close(l.nodes[2].y, 250.0));
        assert!(close(l.nodes[3].x, 400.0) && close(l.nodes[3].y, 70.0));

        // sizes scale linearly with count / max
        assert!(close(l.nodes[0].size, 60.0));
        assert!(close(l.nodes[1].size, 80.0));
        assert!(close(l.nodes[2].size, 120.0));
        assert_eq!(l.max_count, 4);
    }

    #[test]
    fn test_node_colors() {
        let l = layout(&insights(&[("joy", 1), ("mystery", 1)]));
        assert_eq!(l.node("joy").unwrap().color, "#FFD700");
        assert_eq!(l.node("mystery").unwrap().color, "#808080");
    }

    #[test]
    fn test_node_size_zero_max() {
        assert!(close(node_size(0, 0), MIN_NODE_SIZE));
    }

    #[test]
    fn test_render_svg_dims_unselected() {
        let l = layout(&insights(&[("calm", 1), ("joy", 2)]));
        let svg = render_svg(&l, Some("joy"));
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("2 entries"));
        assert!(svg.contains("1 entries"));
        assert_eq!(svg.matches(r#"opacity="0.5""#).count(), 1);
        assert_eq!(svg.matches(r#"opacity="1""#).count(), 2);

        let none = render_svg(&l, None);
        assert_eq!(none.matches(r#"opacity="0.5""#).count(), 0);
    }

    #[test]
    fn test_render_svg_escapes_labels() {
        let l = layout(&insights(&[("<b>&", 1)]));
        let svg = render_svg(&l, None);
        assert!(svg.contains("&lt;b&gt;&amp;"));
    }

    #[test]
    fn test_related_entries() {
        let entries = vec![
            DiaryEntry::new("1", "a", "b").with_mood("Joyful"),
            DiaryEntry::new("2", "a", "b").with_mood("calm"),
            DiaryEntry::new("3", "a", "b"),
        ];
        let related = related_entries(&entries, "JOY");
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].id, "1");
    }
}
