//! Canvas rendering for the atlas.
//!
//! Draws in stacking order: canvas fill (screen space), then in world space
//! the background anchor, edges, and finally map nodes on top.

use std::collections::HashMap;

use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::scale::AtlasConfig;
use super::state::AtlasState;
use super::theme::AtlasTheme;
use super::types::{AtlasNode, NodeKind, Point};

/// Renders the complete atlas to the canvas.
pub fn render(
	state: &AtlasState,
	ctx: &CanvasRenderingContext2d,
	config: &AtlasConfig,
	theme: &AtlasTheme,
	background: Option<&HtmlImageElement>,
) {
	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	let mut nodes: Vec<&AtlasNode> = state.graph.nodes.iter().collect();
	nodes.sort_by_key(|n| n.z_index);

	for node in nodes.iter().filter(|n| n.is_background()) {
		draw_background(ctx, node, background);
	}
	draw_edges(state, ctx, theme);
	for node in nodes.iter().filter(|n| !n.is_background()) {
		draw_node(ctx, node, config, theme, state.transform.k);
	}

	ctx.restore();
}

fn draw_background(
	ctx: &CanvasRenderingContext2d,
	node: &AtlasNode,
	image: Option<&HtmlImageElement>,
) {
	let NodeKind::Background { width, height, .. } = &node.kind else {
		return;
	};
	if let Some(img) = image.filter(|i| i.complete() && i.natural_width() > 0) {
		let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
			img,
			node.position.x,
			node.position.y,
			*width,
			*height,
		);
	}
}

/// Edges are drawn as simple beziers bending along the dominant axis.
fn draw_edges(state: &AtlasState, ctx: &CanvasRenderingContext2d, theme: &AtlasTheme) {
	let positions: HashMap<&str, Point> = state
		.graph
		.map_nodes()
		.map(|n| (n.id.as_str(), n.position))
		.collect();

	ctx.set_stroke_style_str(&theme.edge.to_css());
	ctx.set_line_width(theme.edge_width / state.transform.k);

	for edge in &state.graph.edges {
		let (Some(a), Some(b)) = (
			positions.get(edge.source.as_str()),
			positions.get(edge.target.as_str()),
		) else {
			continue;
		};

		let (dx, dy) = (b.x - a.x, b.y - a.y);
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		if dx.abs() >= dy.abs() {
			let mid = a.x + dx / 2.0;
			ctx.bezier_curve_to(mid, a.y, mid, b.y, b.x, b.y);
		} else {
			let mid = a.y + dy / 2.0;
			ctx.bezier_curve_to(a.x, mid, b.x, mid, b.x, b.y);
		}
		ctx.stroke();
	}
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	node: &AtlasNode,
	config: &AtlasConfig,
	theme: &AtlasTheme,
	k: f64,
) {
	let (w, h) = config.node_size(&node.label);
	let (left, top) = (node.position.x - w / 2.0, node.position.y - h / 2.0);

	ctx.set_global_alpha(node.opacity);

	ctx.set_fill_style_str(&theme.node_fill.to_css());
	ctx.fill_rect(left, top, w, h);

	ctx.set_stroke_style_str(&theme.node_border.to_css());
	ctx.set_line_width(1.0 / k);
	ctx.stroke_rect(left, top, w, h);

	ctx.set_fill_style_str(&node.color.color().to_css());
	ctx.set_font(&format!("{}px sans-serif", config.node_char_width * 1.7));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(&node.label, node.position.x, node.position.y);

	ctx.set_global_alpha(1.0);
}
