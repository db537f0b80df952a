//! The pod board and its circle creator.
//!
//! The board is an SVG document whose root carries `id="board"`. The circle
//! creator appends one fixed black circle under it per call.

use crate::error::CoreError;
use crate::svg::{Document, NodeId};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Identifier of the container element that receives new circles.
pub const BOARD_ID: &str = "board";

pub const CIRCLE_ID: &str = "mycircle";
pub const CIRCLE_CX: u32 = 100;
pub const CIRCLE_CY: u32 = 100;
pub const CIRCLE_R: u32 = 50;
pub const CIRCLE_FILL: &str = "black";
pub const CIRCLE_STROKE: &str = "none";

/// Create an empty board: an `<svg id="board">` root of the given size.
pub fn new_board(width: u32, height: u32) -> Document {
    let mut doc = Document::new(SVG_NS, "svg");
    doc.set_root_attribute("id", BOARD_ID);
    doc.set_root_attribute("width", width.to_string());
    doc.set_root_attribute("height", height.to_string());
    doc
}

/// Append a circle (id `mycircle`, center (100,100), radius 50, black fill,
/// no stroke) as the last child of the `board` element.
///
/// Repeated calls append more circles with the same `id`. If the document
/// has no attached `board` element nothing is created and
/// [`CoreError::NotFound`] is returned.
pub fn create_circle(doc: &mut Document) -> Result<NodeId, CoreError> {
    let board = doc
        .get_element_by_id(BOARD_ID)
        .ok_or(CoreError::NotFound {
            entity: "element",
            id: BOARD_ID.to_string(),
        })?;

    let circle = doc.create_element_ns(SVG_NS, "circle");
    doc.set_attribute(circle, "id", CIRCLE_ID)?;
    doc.set_attribute(circle, "cx", CIRCLE_CX.to_string())?;
    doc.set_attribute(circle, "cy", CIRCLE_CY.to_string())?;
    doc.set_attribute(circle, "r", CIRCLE_R.to_string())?;
    doc.set_attribute(circle, "fill", CIRCLE_FILL)?;
    doc.set_attribute(circle, "stroke", CIRCLE_STROKE)?;
    doc.append_child(board, circle)?;

    tracing::debug!(
        circles = doc.children(board).len(),
        "Circle appended to board"
    );
    Ok(circle)
}

/// Number of circle elements directly under the board, if there is one.
pub fn circle_count(doc: &Document) -> Option<usize> {
    let board = doc.get_element_by_id(BOARD_ID)?;
    Some(
        doc.children(board)
            .iter()
            .filter(|child| doc.element(**child).is_some_and(|e| e.tag() == "circle"))
            .count(),
    )
}
