use phoenix_widgets_core::{
    Constraints, HostedWidget, InMemoryWidgetHost, PlacementSolver, Rect, RelevanceModel, Size,
    SystemClock, Viewport, WidgetAwareness,
};
use proptest::prelude::*;

fn widget(x: f64, y: f64, w: f64, h: f64) -> HostedWidget {
    HostedWidget {
        id: "w".into(),
        widget_type: "calendar-today".into(),
        rect: Rect::new(x, y, w, h),
        visible: true,
    }
}

proptest! {
    #[test]
    fn relevance_stays_in_unit_range(
        hours_since_view in -100.0f64..10_000.0,
        hours_old in -100.0f64..10_000.0,
        interactions in 0u64..100_000,
    ) {
        let b = RelevanceModel::new().score_components(hours_since_view, hours_old, interactions);
        prop_assert!(b.score.is_finite());
        prop_assert!((0.0..=1.0).contains(&b.score));
    }

    #[test]
    fn boundary_enforcement_is_idempotent(
        x in -3000.0f64..3000.0,
        y in -3000.0f64..3000.0,
        w in 1.0f64..2000.0,
        h in 1.0f64..2000.0,
        vw in 200.0f64..2560.0,
        vh in 200.0f64..1600.0,
    ) {
        let solver = PlacementSolver::default();
        let viewport = Viewport::new(vw, vh);
        let mut el = widget(x, y, w, h);

        let first = solver.enforce_screen_boundaries(&mut el, &viewport);
        let second = solver.enforce_screen_boundaries(&mut el, &viewport);

        prop_assert_eq!(first.x, second.x);
        prop_assert_eq!(first.y, second.y);
        prop_assert!(!second.constrained);
        prop_assert!(first.x >= 10.0 && first.y >= 10.0);
    }

    #[test]
    fn collisions_are_unordered_pairs(
        rects in prop::collection::vec((0.0f64..1000.0, 0.0f64..800.0, 10.0f64..400.0, 10.0f64..300.0), 0..10),
    ) {
        let solver = PlacementSolver::default();
        let widgets: Vec<(String, Rect)> = rects
            .iter()
            .enumerate()
            .map(|(i, &(x, y, w, h))| (format!("w{i}"), Rect::new(x, y, w, h)))
            .collect();
        let reversed: Vec<(String, Rect)> = widgets.iter().rev().cloned().collect();

        let forward = solver.detect_collisions(&widgets);
        let backward = solver.detect_collisions(&reversed);
        prop_assert_eq!(forward.len(), backward.len());

        for c in &forward {
            prop_assert_ne!(&c.widget1, &c.widget2);
            prop_assert!(backward
                .iter()
                .any(|b| b.involves(&c.widget1) && b.involves(&c.widget2)));
        }
    }

    #[test]
    fn placed_widgets_never_overlap(
        sizes in prop::collection::vec((100.0f64..800.0, 50.0f64..700.0), 1..12),
    ) {
        let engine = WidgetAwareness::new(SystemClock);
        let viewport = Viewport::new(1440.0, 900.0);
        let mut host = InMemoryWidgetHost::new();

        for (i, (w, h)) in sizes.into_iter().enumerate() {
            if let Ok(rect) = engine.place_widget(&host, Size::new(w, h), &viewport) {
                prop_assert!(rect.within(&viewport, 10.0));
                host.add_widget(format!("w{i}"), "health-recovery", rect);
            }
        }

        prop_assert!(host.len() <= Constraints::default().max_widgets);
        prop_assert!(engine.detect_host_collisions(&host).is_empty());
    }

    #[test]
    fn free_position_clears_arbitrary_layouts(
        existing in prop::collection::vec((0.0f64..1400.0, 0.0f64..880.0, 20.0f64..600.0, 20.0f64..500.0), 0..8),
        w in 50.0f64..700.0,
        h in 50.0f64..600.0,
    ) {
        let solver = PlacementSolver::default();
        let viewport = Viewport::new(1440.0, 900.0);
        let existing: Vec<Rect> = existing
            .into_iter()
            .map(|(x, y, w, h)| Rect::new(x, y, w, h))
            .collect();
        let size = Size::new(w, h);

        if let Some(pos) = solver.find_optimal_position(&existing, size, &viewport) {
            let placed = Rect::at(pos, size);
            prop_assert!(placed.within(&viewport, 10.0));
            for r in &existing {
                prop_assert!(!placed.overlaps(r), "{:?} overlaps {:?}", placed, r);
            }
        }
    }
}
