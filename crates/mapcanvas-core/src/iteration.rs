//! Walk the features that are visible in a viewport, layer by layer.

use crate::feature::Feature;
use crate::layer::Layer;
use crate::style::Style;
use crate::viewport::Viewport;

/// Call `render` with `(viewport, style, feature)` for every visible feature.
///
/// Layers outside their visible resolution range are skipped. For each
/// feature the layer style comes first, then the feature's own styles; a
/// style is used only if it applies at the viewport resolution. The first
/// error returned by `render` stops the walk.
pub fn iterate_layers<E, F>(
    viewport: &Viewport,
    layers: &mut [Box<dyn Layer>],
    mut render: F,
) -> Result<(), E>
where
    F: FnMut(&Viewport, &Style, &mut Feature) -> Result<(), E>,
{
    let extent = viewport.extent();
    let resolution = viewport.resolution;

    for layer in layers.iter_mut() {
        if !layer.is_visible_at(resolution) {
            log::trace!("Layer '{}' hidden at resolution {}", layer.name(), resolution);
            continue;
        }

        let layer_style = layer
            .style()
            .filter(|s| s.applies_at(resolution))
            .cloned();

        for feature in layer.features_in_view_mut(&extent, resolution) {
            if let Some(style) = &layer_style {
                render(viewport, style, feature)?;
            }
            // Own styles are cloned so the feature can be borrowed mutably.
            let own: Vec<Style> = feature
                .styles
                .iter()
                .filter(|s| s.applies_at(resolution))
                .cloned()
                .collect();
            for style in &own {
                render(viewport, style, feature)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;
    use crate::layer::MemoryLayer;
    use crate::style::StyleId;

    fn raster(x: f64) -> Feature {
        Feature::raster(vec![0], BBox::from_coords(x, 0.0, x + 1.0, 1.0))
    }

    #[test]
    fn test_layer_then_feature_styles() {
        let layer_style = Style::new();
        let own = Style::new();
        let hidden = Style::new().with_visible_range(100.0, 200.0);
        let mut layer = MemoryLayer::new("a").with_style(layer_style.clone());
        layer.add_feature(raster(0.0).with_style(own.clone()).with_style(hidden));

        let mut layers: Vec<Box<dyn Layer>> = vec![Box::new(layer)];
        let viewport = Viewport::new(100.0, 100.0);
        let mut seen: Vec<StyleId> = Vec::new();
        iterate_layers::<(), _>(&viewport, &mut layers, |_, style, _| {
            seen.push(style.id);
            Ok(())
        })
        .unwrap();

        assert_eq!(seen, vec![layer_style.id, own.id]);
    }

    #[test]
    fn test_skips_hidden_layers_and_offscreen_features() {
        let mut near = MemoryLayer::new("near");
        near.add_feature(raster(0.0));
        near.add_feature(raster(10_000.0));
        let mut far = MemoryLayer::new("far").with_visible_range(50.0, 60.0);
        far.add_feature(raster(0.0));

        let mut layers: Vec<Box<dyn Layer>> = vec![Box::new(near), Box::new(far)];
        let viewport = Viewport::new(100.0, 100.0);
        let mut count = 0;
        iterate_layers::<(), _>(&viewport, &mut layers, |_, _, _| {
            count += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_first_error_stops_walk() {
        let mut layer = MemoryLayer::new("a");
        layer.add_feature(raster(0.0));
        layer.add_feature(raster(2.0));
        let mut layers: Vec<Box<dyn Layer>> = vec![Box::new(layer)];
        let viewport = Viewport::new(100.0, 100.0);
        let mut calls = 0;
        let result = iterate_layers(&viewport, &mut layers, |_, _, _| {
            calls += 1;
            Err("boom")
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(calls, 1);
    }
}
