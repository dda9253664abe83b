use crate::page::geometry::{Area, Axis};

/// Tuning knobs for one axis pass of the table inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableAxisOptions {
    /// Pick the narrowest (`true`) or widest (`false`) unassigned line as the
    /// ruler for each group. Which one is the reliable alignment anchor
    /// depends on the report layout.
    pub small_rule: bool,
    /// `true`: a candidate joins the group when the ruler's center falls
    /// inside the candidate's own bounds. `false`: when the candidate's
    /// center falls inside the ruler's bounds.
    pub use_ruler_pos: bool,
}

impl Default for TableAxisOptions {
    fn default() -> Self {
        TableAxisOptions {
            small_rule: true,
            use_ruler_pos: true,
        }
    }
}

/// Assign a zero-based group index along `axis` to every area.
///
/// The areas come from absolutely-positioned text lines with no table markup,
/// so grouping is inferred greedily: repeatedly take the unassigned line with
/// the smallest (or largest) extent as a ruler, sweep the remaining
/// unassigned lines into its group by positional containment, and continue
/// until everything is grouped. Group indices are then renumbered so they
/// increase with the ruler coordinate (left-to-right for columns).
///
/// Each pass consumes at least its own ruler, so the loop terminates even
/// when some lines overlap no other group.
pub fn table_positions(areas: &[Area], axis: Axis, opts: TableAxisOptions) -> Vec<usize> {
    let mut indexes: Vec<Option<usize>> = vec![None; areas.len()];
    let mut rulers: Vec<(usize, f64)> = Vec::new();

    loop {
        let group = rulers.len();

        // Ruler: first unassigned area with minimal (or maximal) extent.
        let mut ruler: Option<(usize, f64)> = None;
        for (i, area) in areas.iter().enumerate() {
            if indexes[i].is_some() {
                continue;
            }
            let extent = axis.extent(area);
            let better = match ruler {
                None => true,
                Some((_, best)) => {
                    if opts.small_rule {
                        extent < best
                    } else {
                        extent > best
                    }
                }
            };
            if better {
                ruler = Some((i, extent));
            }
        }
        let Some((ruler_idx, _)) = ruler else {
            break;
        };

        let ruler_bounds = axis.bounds(&areas[ruler_idx]);
        let ruler_pos = axis.center(&areas[ruler_idx]);
        rulers.push((group, ruler_pos));

        for (i, area) in areas.iter().enumerate() {
            if indexes[i].is_some() {
                continue;
            }
            let member = if opts.use_ruler_pos {
                axis.bounds(area).contains(ruler_pos)
            } else {
                ruler_bounds.contains(axis.center(area))
            };
            if member {
                indexes[i] = Some(group);
            }
        }
    }

    // Renumber groups in increasing coordinate order.
    let mut order = rulers;
    order.sort_by(|a, b| a.1.total_cmp(&b.1));
    let mut remap = vec![0usize; order.len()];
    for (new, (old, _)) in order.iter().enumerate() {
        remap[*old] = new;
    }

    // Every area is assigned before the loop above exits.
    indexes
        .into_iter()
        .map(|g| g.map_or(0, |g| remap[g]))
        .collect()
}
