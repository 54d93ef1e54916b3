//! Drainage-area accumulation along the topological order.

use crate::flow::{FlowField, FlowStack};

/// Accumulate drainage area by walking the stack order upstream to
/// downstream.
///
/// Every cell starts at its own intrinsic area; visiting cells from the most
/// upstream end of the order, each cell's accumulated total is added to its
/// receiver, so by the time a cell is visited all of its donors have already
/// contributed. Area is conserved: the totals at the sinks sum to the whole
/// grid area.
///
/// `area` is resized to the grid and overwritten.
pub fn accumulate_area(flow: &FlowField, stack: &FlowStack, cell_area: f64, area: &mut Vec<f64>) {
    let receivers = flow.receivers();
    area.clear();
    area.resize(receivers.len(), cell_area);

    for &i in stack.order().iter().rev() {
        let r = receivers[i];
        if r != i {
            area[r] += area[i];
        }
    }
}
