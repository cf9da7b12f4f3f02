use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gap left between consecutive order indices so scenes can be moved
/// between neighbours without renumbering the whole chapter.
pub const ORDER_GAP: f64 = 1000.0;

/// Review state of a scene's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionStatus {
    #[default]
    Unreviewed,
    AiProcessed,
    HumanApproved,
}

/// One scene of narrative markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
    /// Markup text, not display text.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: RevisionStatus,
    #[serde(default)]
    pub order_idx: f64,
}

impl Scene {
    pub fn new(title: impl Into<String>, order_idx: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: String::new(),
            status: RevisionStatus::Unreviewed,
            order_idx,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub order_idx: f64,
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

impl Chapter {
    pub fn new(title: impl Into<String>, order_idx: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            order_idx,
            scenes: Vec::new(),
        }
    }

    /// Order index for a scene appended after the current ones.
    pub fn next_scene_order(&self) -> f64 {
        next_order(self.scenes.iter().map(|s| s.order_idx))
    }

    /// Re-space scene order indices back to full gaps, keeping their
    /// relative order. Needed once repeated between-neighbour inserts have
    /// squeezed the gaps too thin.
    pub fn rebalance_scenes(&mut self) {
        self.scenes.sort_by(|a, b| a.order_idx.total_cmp(&b.order_idx));
        for (i, scene) in self.scenes.iter_mut().enumerate() {
            scene.order_idx = (i as f64 + 1.0) * ORDER_GAP;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub order_idx: f64,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

impl Part {
    pub fn new(title: impl Into<String>, order_idx: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            order_idx,
            chapters: Vec::new(),
        }
    }

    pub fn next_chapter_order(&self) -> f64 {
        next_order(self.chapters.iter().map(|c| c.order_idx))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Book {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            parts: Vec::new(),
        }
    }

    pub fn next_part_order(&self) -> f64 {
        next_order(self.parts.iter().map(|p| p.order_idx))
    }

    /// Assign gap-spaced order indices anywhere they are missing or
    /// duplicated, e.g. after importing a legacy export that carried none.
    pub fn normalize_orders(&mut self) {
        self.parts.sort_by(|a, b| a.order_idx.total_cmp(&b.order_idx));
        for (pi, part) in self.parts.iter_mut().enumerate() {
            part.order_idx = (pi as f64 + 1.0) * ORDER_GAP;
            part.chapters
                .sort_by(|a, b| a.order_idx.total_cmp(&b.order_idx));
            for (ci, chapter) in part.chapters.iter_mut().enumerate() {
                chapter.order_idx = (ci as f64 + 1.0) * ORDER_GAP;
                chapter.rebalance_scenes();
            }
        }
    }
}

fn next_order(orders: impl Iterator<Item = f64>) -> f64 {
    let max = orders.fold(f64::NEG_INFINITY, f64::max);
    if max.is_finite() { max + ORDER_GAP } else { ORDER_GAP }
}
