//! The widget manager seen from the engine.
//!
//! The engine never owns widgets. It asks a [`WidgetHost`] which widgets are
//! on screen and tells it which ones to take down.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Point, Positionable, Rect};

/// Active widget collection owned by the rendering side.
pub trait WidgetHost {
    /// Ids of every active widget, in display order.
    fn active_widget_ids(&self) -> Vec<String>;

    /// Whether the widget is currently shown.
    fn is_visible(&self, widget_id: &str) -> bool;

    /// Current bounding box, `None` for unknown ids.
    fn rect(&self, widget_id: &str) -> Option<Rect>;

    /// Take the widget down. Unknown ids are ignored.
    fn remove_widget(&mut self, widget_id: &str);

    /// Movable handle for boundary correction, `None` for unknown ids.
    fn widget_mut(&mut self, widget_id: &str) -> Option<&mut dyn Positionable>;

    fn active_rects(&self) -> Vec<(String, Rect)> {
        self.active_widget_ids()
            .into_iter()
            .filter_map(|id| self.rect(&id).map(|r| (id, r)))
            .collect()
    }

    fn active_count(&self) -> usize {
        self.active_widget_ids().len()
    }
}

/// One widget as tracked by [`InMemoryWidgetHost`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostedWidget {
    pub id: String,
    /// Widget type key such as `health-recovery` or `sleep-quality`.
    pub widget_type: String,
    pub rect: Rect,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Positionable for HostedWidget {
    fn bounding_rect(&self) -> Rect {
        self.rect
    }

    fn position(&self) -> Option<Point> {
        Some(self.rect.origin())
    }

    fn set_position(&mut self, position: Point) {
        self.rect.x = position.x;
        self.rect.y = position.y;
    }
}

/// Headless widget manager used by the CLI and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWidgetHost {
    widgets: IndexMap<String, HostedWidget>,
    removed: Vec<String>,
}

impl InMemoryWidgetHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a widget. New widgets start visible.
    pub fn add_widget(
        &mut self,
        id: impl Into<String>,
        widget_type: impl Into<String>,
        rect: Rect,
    ) -> &mut HostedWidget {
        let id = id.into();
        let widget = HostedWidget {
            id: id.clone(),
            widget_type: widget_type.into(),
            rect,
            visible: true,
        };
        self.widgets.insert(id.clone(), widget);
        &mut self.widgets[&id]
    }

    /// Add a widget under a freshly generated `genesis_widget_*` id.
    pub fn add_generated(&mut self, widget_type: impl Into<String>, rect: Rect) -> String {
        let id = format!("genesis_widget_{}", Uuid::new_v4().simple());
        self.add_widget(id.clone(), widget_type, rect);
        id
    }

    pub fn get(&self, widget_id: &str) -> Option<&HostedWidget> {
        self.widgets.get(widget_id)
    }

    pub fn get_mut(&mut self, widget_id: &str) -> Option<&mut HostedWidget> {
        self.widgets.get_mut(widget_id)
    }

    pub fn widgets(&self) -> impl Iterator<Item = &HostedWidget> {
        self.widgets.values()
    }

    pub fn set_visible(&mut self, widget_id: &str, visible: bool) {
        if let Some(w) = self.widgets.get_mut(widget_id) {
            w.visible = visible;
        }
    }

    /// Ids removed through [`WidgetHost::remove_widget`], oldest first.
    pub fn removed(&self) -> &[String] {
        &self.removed
    }

    pub fn clear_all(&mut self) {
        let ids: Vec<String> = self.widgets.keys().cloned().collect();
        for id in ids {
            self.remove_widget(&id);
        }
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

impl WidgetHost for InMemoryWidgetHost {
    fn active_widget_ids(&self) -> Vec<String> {
        self.widgets.keys().cloned().collect()
    }

    fn is_visible(&self, widget_id: &str) -> bool {
        self.widgets.get(widget_id).is_some_and(|w| w.visible)
    }

    fn rect(&self, widget_id: &str) -> Option<Rect> {
        self.widgets.get(widget_id).map(|w| w.rect)
    }

    fn remove_widget(&mut self, widget_id: &str) {
        if self.widgets.shift_remove(widget_id).is_some() {
            self.removed.push(widget_id.to_string());
        }
    }

    fn widget_mut(&mut self, widget_id: &str) -> Option<&mut dyn Positionable> {
        self.widgets
            .get_mut(widget_id)
            .map(|w| w as &mut dyn Positionable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove() {
        let mut host = InMemoryWidgetHost::new();
        host.add_widget("a", "health-recovery", Rect::new(10.0, 10.0, 300.0, 120.0));
        host.add_widget("b", "sleep-quality", Rect::new(400.0, 10.0, 300.0, 120.0));

        assert_eq!(host.active_widget_ids(), vec!["a", "b"]);
        host.remove_widget("a");
        host.remove_widget("missing");

        assert_eq!(host.active_widget_ids(), vec!["b"]);
        assert_eq!(host.removed(), &["a".to_string()]);
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut host = InMemoryWidgetHost::new();
        let a = host.add_generated("calendar-today", Rect::default());
        let b = host.add_generated("calendar-today", Rect::default());
        assert_ne!(a, b);
        assert!(a.starts_with("genesis_widget_"));
    }

    #[test]
    fn visibility_toggle() {
        let mut host = InMemoryWidgetHost::new();
        host.add_widget("a", "x", Rect::default());
        assert!(host.is_visible("a"));
        host.set_visible("a", false);
        assert!(!host.is_visible("a"));
        assert!(!host.is_visible("nope"));
    }

    #[test]
    fn clear_all_records_removals() {
        let mut host = InMemoryWidgetHost::new();
        host.add_widget("a", "x", Rect::default());
        host.add_widget("b", "x", Rect::default());
        host.clear_all();
        assert!(host.is_empty());
        assert_eq!(host.removed().len(), 2);
    }

    #[test]
    fn set_position_moves_rect() {
        let mut host = InMemoryWidgetHost::new();
        host.add_widget("a", "x", Rect::new(0.0, 0.0, 50.0, 50.0));
        let w = host.get_mut("a").unwrap();
        w.set_position(Point::new(20.0, 30.0));
        assert_eq!(host.rect("a"), Some(Rect::new(20.0, 30.0, 50.0, 50.0)));
    }
}
