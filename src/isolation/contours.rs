use image::GrayImage;
use imageproc::contours::find_contours as trace_borders;

use crate::models::Contour;

/// Trace every border in the edge map as a flat list.
/// Nesting is ignored and no points are dropped along straight runs.
pub fn find_contours(edges: &GrayImage) -> Vec<Contour> {
    trace_borders::<i32>(edges)
        .into_iter()
        .filter(|c| !c.points.is_empty())
        .map(|c| Contour::new(c.points))
        .collect()
}

/// The contour enclosing the largest area; the earliest one wins a tie
pub fn largest_contour(contours: &[Contour]) -> Option<&Contour> {
    let mut best: Option<(&Contour, f64)> = None;
    for contour in contours {
        let area = contour.area();
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((contour, area)),
        }
    }
    best.map(|(c, _)| c)
}
