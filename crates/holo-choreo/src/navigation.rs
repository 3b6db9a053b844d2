//! Navigation - carousel selection and inspection rotation
//!
//! The selection index is clamped on every item update and reset when the
//! head of the item list changes (a different item set) or when the carousel
//! is entered fresh. Inspection keeps its own two-axis rotation, cleared on
//! exit.

use std::f32::consts::FRAC_PI_2;

use holo_core::{Direction, ItemId, Phase};
use serde::Serialize;
use tracing::{debug, warn};

/// Spacing between carousel slots
pub const CAROUSEL_SPACING: f32 = 2.5;
/// Scale of the selected slot
pub const SELECTED_SCALE: f32 = 1.0;
/// Scale of the other slots
pub const UNSELECTED_SCALE: f32 = 0.7;

/// One step through the carousel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectStep {
    Prev,
    Next,
}

/// Accumulated product rotation in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct InspectionRotation {
    /// Around the horizontal axis (up/down swipes)
    pub pitch: f32,
    /// Around the vertical axis (left/right swipes)
    pub yaw: f32,
}

impl InspectionRotation {
    pub fn apply(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.yaw -= FRAC_PI_2,
            Direction::Right => self.yaw += FRAC_PI_2,
            Direction::Up => self.pitch -= FRAC_PI_2,
            Direction::Down => self.pitch += FRAC_PI_2,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.pitch == 0.0 && self.yaw == 0.0
    }
}

/// Placement of one carousel item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarouselSlot {
    pub item: ItemId,
    /// Horizontal offset from the carousel centre
    pub offset: f32,
    pub scale: f32,
    pub selected: bool,
}

/// Selection and rotation state
#[derive(Debug, Default)]
pub struct NavigationController {
    items: Vec<ItemId>,
    index: usize,
    /// Head of the last observed item list
    first_item: Option<ItemId>,
    rotation: InspectionRotation,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a new item list
    pub fn update_items(&mut self, items: Vec<ItemId>) {
        let head = items.first().cloned();
        if head != self.first_item {
            debug!(from = ?self.first_item, to = ?head, "item set changed, selection reset");
            self.index = 0;
            self.first_item = head;
        }
        self.items = items;
        self.clamp_index();
    }

    /// React to a phase transition
    pub fn on_phase_change(&mut self, from: Phase, to: Phase) {
        if to == Phase::Carousel && from != Phase::Inspection && from != Phase::Carousel {
            self.index = 0;
        }
        if from == Phase::Inspection && to != Phase::Inspection {
            self.rotation = InspectionRotation::default();
        }
    }

    /// Move the selection; returns the new index
    pub fn select(&mut self, step: SelectStep) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        let last = self.items.len() - 1;
        self.index = match step {
            SelectStep::Prev => self.index.saturating_sub(1),
            SelectStep::Next => (self.index + 1).min(last),
        };
        Some(self.index)
    }

    pub fn rotate(&mut self, direction: Direction) {
        self.rotation.apply(direction);
    }

    /// Selected index, `None` when there are no items
    pub fn selected(&self) -> Option<usize> {
        (!self.items.is_empty()).then_some(self.index)
    }

    pub fn selected_item(&self) -> Option<&ItemId> {
        self.selected().and_then(|i| self.items.get(i))
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn rotation(&self) -> InspectionRotation {
        self.rotation
    }

    /// Slot placement for every item around the selection
    pub fn carousel_layout(&self) -> Vec<CarouselSlot> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let selected = i == self.index;
                CarouselSlot {
                    item: item.clone(),
                    offset: (i as f32 - self.index as f32) * CAROUSEL_SPACING,
                    scale: if selected { SELECTED_SCALE } else { UNSELECTED_SCALE },
                    selected,
                }
            })
            .collect()
    }

    fn clamp_index(&mut self) {
        if self.items.is_empty() {
            self.index = 0;
            return;
        }
        let last = self.items.len() - 1;
        if self.index > last {
            warn!(index = self.index, last, "selection out of range, clamped");
            self.index = last;
        }
    }
}
