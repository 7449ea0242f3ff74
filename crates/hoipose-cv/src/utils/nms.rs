//! Class-aware non-maximum suppression

use crate::bbox::BBox;

/// Greedy class-aware NMS.
///
/// Visits boxes by descending `priority`; a box is dropped when its IoU
/// with an already kept box of the same label is above `iou_threshold`.
/// Equal priorities are visited in input order. Returns kept indices in
/// visiting order.
///
/// All three slices must have the same length.
pub fn class_aware_nms(boxes: &[BBox], labels: &[i64], priority: &[f64], iou_threshold: f64) -> Vec<usize> {
    let preferred = vec![false; boxes.len()];
    class_aware_nms_preferring(boxes, labels, priority, &preferred, iou_threshold)
}

/// Same as [`class_aware_nms`], except that on equal priority a
/// `preferred` box is visited before a non-preferred one. Remaining ties
/// keep input order.
pub fn class_aware_nms_preferring(
    boxes: &[BBox],
    labels: &[i64],
    priority: &[f64],
    preferred: &[bool],
    iou_threshold: f64,
) -> Vec<usize> {
    debug_assert_eq!(boxes.len(), labels.len());
    debug_assert_eq!(boxes.len(), priority.len());
    debug_assert_eq!(boxes.len(), preferred.len());

    let mut order: Vec<usize> = (0..boxes.len()).collect();
    // Stable sort, so full ties keep input order.
    order.sort_by(|&a, &b| {
        priority[b]
            .total_cmp(&priority[a])
            .then_with(|| preferred[b].cmp(&preferred[a]))
    });

    let mut keep: Vec<usize> = Vec::with_capacity(boxes.len());
    for i in order {
        let suppressed = keep
            .iter()
            .any(|&k| labels[k] == labels[i] && boxes[k].overlaps(&boxes[i], iou_threshold));
        if !suppressed {
            keep.push(i);
        }
    }

    keep
}
