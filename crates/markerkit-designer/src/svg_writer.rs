//! SVG encoding of a [`VectorDocument`].
//!
//! The document is sized in inches and its viewBox is in inches, so one user
//! unit is one inch. Each layer is a top-level group marked as an Inkscape
//! layer. Output contains no timestamps or generated ids, so the same
//! document always encodes to the same bytes.

use markerkit_core::units::format_coord;
use markerkit_core::Rect;

use crate::vector_export::{
    LayerKind, OutlineSource, PathCommand, Placement, TextRun, VectorDocument, VectorEntity,
    VectorLayer,
};

const STROKE_WIDTH_IN: f64 = 0.01;

/// Encodes `doc` with `decimals` places for every coordinate.
pub fn write_svg(doc: &VectorDocument, decimals: usize) -> String {
    let c = |v: f64| format_coord(v, decimals);
    let mut svg = String::new();

    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" \
         xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
         xmlns:inkscape=\"http://www.inkscape.org/namespaces/inkscape\" \
         width=\"{w}in\" height=\"{h}in\" viewBox=\"0 0 {w} {h}\" \
         data-template=\"{t}\" data-material=\"{m}\">\n",
        w = c(doc.width),
        h = c(doc.height),
        t = escape_xml(&doc.template_id),
        m = escape_xml(&doc.material_id),
    ));
    svg.push_str(&format!("  <title>{}</title>\n", escape_xml(&doc.title)));

    for layer in &doc.layers {
        write_layer(&mut svg, layer, decimals);
    }

    svg.push_str("</svg>\n");
    svg
}

fn write_layer(svg: &mut String, layer: &VectorLayer, decimals: usize) {
    let style = match layer.kind {
        LayerKind::Outline => format!(
            " fill=\"none\" stroke=\"#000000\" stroke-width=\"{}\"",
            format_coord(STROKE_WIDTH_IN, decimals)
        ),
        LayerKind::Text => " fill=\"#000000\" stroke=\"none\"".to_string(),
        LayerKind::Decoration | LayerKind::Artwork => String::new(),
    };

    if layer.is_empty() {
        svg.push_str(&format!(
            "  <g id=\"{n}\" inkscape:groupmode=\"layer\" inkscape:label=\"{n}\"{s}/>\n",
            n = layer.name(),
            s = style
        ));
        return;
    }

    svg.push_str(&format!(
        "  <g id=\"{n}\" inkscape:groupmode=\"layer\" inkscape:label=\"{n}\"{s}>\n",
        n = layer.name(),
        s = style
    ));
    for entity in &layer.entities {
        match entity {
            VectorEntity::Outline(o) => {
                let kind = match &o.source {
                    OutlineSource::EditZone => "data-kind=\"edit-zone\"".to_string(),
                    OutlineSource::BaseRegion { material_id } => format!(
                        "data-kind=\"base\" data-material=\"{}\"",
                        escape_xml(material_id)
                    ),
                };
                svg.push_str(&format!(
                    "    <rect data-id=\"{}\" {} {}/>\n",
                    escape_xml(&o.id),
                    kind,
                    rect_attrs(&o.rect, decimals)
                ));
            }
            VectorEntity::Text(run) => write_text_run(svg, run, decimals),
            VectorEntity::Placement(p) => write_placement(svg, p, decimals),
        }
    }
    svg.push_str("  </g>\n");
}

fn write_text_run(svg: &mut String, run: &TextRun, decimals: usize) {
    let c = |v: f64| format_coord(v, decimals);
    let mut attrs = format!(
        "data-seq=\"{}\" data-content=\"{}\" data-family=\"{}\" data-size=\"{}\" \
         data-x=\"{}\" data-y=\"{}\" data-rotation=\"{}\"",
        run.sequence,
        escape_xml(&run.content),
        escape_xml(&run.family),
        c(run.size),
        c(run.position.x),
        c(run.position.y),
        c(run.rotation)
    );
    if run.requested_family != run.family {
        attrs.push_str(&format!(
            " data-requested-family=\"{}\"",
            escape_xml(&run.requested_family)
        ));
    }

    svg.push_str(&format!("    <g {}>\n", attrs));
    if run.has_outlines() {
        for glyph in &run.glyphs {
            svg.push_str(&format!("      <path d=\"{}\"/>\n", path_data(glyph, decimals)));
        }
    } else {
        let mut text = format!(
            "      <text x=\"{x}\" y=\"{y}\" font-family=\"{f}\" font-size=\"{s}\" \
             dominant-baseline=\"hanging\"",
            x = c(run.position.x),
            y = c(run.position.y),
            f = escape_xml(&run.family),
            s = c(run.size)
        );
        if run.rotation.abs() > 0.0 {
            text.push_str(&format!(
                " transform=\"rotate({} {} {})\"",
                c(run.rotation),
                c(run.position.x),
                c(run.position.y)
            ));
        }
        svg.push_str(&format!("{}>{}</text>\n", text, escape_xml(&run.content)));
    }
    svg.push_str("    </g>\n");
}

fn write_placement(svg: &mut String, p: &Placement, decimals: usize) {
    let tag = match (&p.sequence, &p.slot_id) {
        (Some(seq), _) => format!("data-seq=\"{}\"", seq),
        (None, Some(slot)) => format!("data-slot=\"{}\"", escape_xml(slot)),
        (None, None) => String::new(),
    };
    svg.push_str(&format!(
        "    <image {} xlink:href=\"{}\" {} preserveAspectRatio=\"none\"/>\n",
        tag,
        escape_xml(&p.image_ref),
        rect_attrs(&p.rect, decimals)
    ));
}

fn rect_attrs(r: &Rect, decimals: usize) -> String {
    format!(
        "x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
        format_coord(r.x, decimals),
        format_coord(r.y, decimals),
        format_coord(r.width, decimals),
        format_coord(r.height, decimals)
    )
}

/// SVG path data for a command list.
pub fn path_data(commands: &[PathCommand], decimals: usize) -> String {
    let c = |v: f64| format_coord(v, decimals);
    let mut d = String::new();
    for cmd in commands {
        if !d.is_empty() {
            d.push(' ');
        }
        match cmd {
            PathCommand::MoveTo(p) => d.push_str(&format!("M {} {}", c(p.x), c(p.y))),
            PathCommand::LineTo(p) => d.push_str(&format!("L {} {}", c(p.x), c(p.y))),
            PathCommand::QuadTo { ctrl, to } => d.push_str(&format!(
                "Q {} {} {} {}",
                c(ctrl.x),
                c(ctrl.y),
                c(to.x),
                c(to.y)
            )),
            PathCommand::CubicTo { ctrl1, ctrl2, to } => d.push_str(&format!(
                "C {} {} {} {} {} {}",
                c(ctrl1.x),
                c(ctrl1.y),
                c(ctrl2.x),
                c(ctrl2.y),
                c(to.x),
                c(to.y)
            )),
            PathCommand::Close => d.push('Z'),
        }
    }
    d
}

/// Escape the five XML special characters.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
