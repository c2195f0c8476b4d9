use serde::{Deserialize, Serialize};
use shared::domain::{EntryId, OutcomeItem, Rgb};

use crate::editable_list::{Backed, EditableList};
use crate::ids::IdGenerator;

pub const VISIBLE_WINDOW: usize = 2;

pub const BRAND: Rgb = Rgb::new(0x7e, 0x1e, 0x9b);
const CARD_BORDER: Rgb = Rgb::new(0xf3, 0xf4, 0xf6);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Direct,
    Indirect,
    Ultimate,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 3] = [OutcomeKind::Direct, OutcomeKind::Indirect, OutcomeKind::Ultimate];

    pub fn id_prefix(self) -> &'static str {
        match self {
            OutcomeKind::Direct => "d",
            OutcomeKind::Indirect => "i",
            OutcomeKind::Ultimate => "u",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "direct" => Some(OutcomeKind::Direct),
            "indirect" => Some(OutcomeKind::Indirect),
            "ultimate" | "impact" => Some(OutcomeKind::Ultimate),
            _ => None,
        }
    }

    fn highlighted_index(self) -> Option<usize> {
        match self {
            OutcomeKind::Direct => Some(1),
            OutcomeKind::Indirect | OutcomeKind::Ultimate => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeStyle {
    pub title: String,
    pub subtitle: String,
    pub footer_text: String,
    pub footer_background: Rgb,
    pub footer_foreground: Rgb,
    pub border_color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeListConfig {
    #[serde(flatten)]
    pub style: OutcomeStyle,
    #[serde(default)]
    pub initial_items: Vec<OutcomeItem>,
}

impl OutcomeListConfig {
    pub fn direct_outcomes() -> Self {
        Self {
            style: OutcomeStyle {
                title: "Direct outcomes".into(),
                subtitle: "Changes we influence directly".into(),
                footer_text: "Zone of direct influence".into(),
                footer_background: BRAND,
                footer_foreground: Rgb::WHITE,
                border_color: CARD_BORDER,
            },
            initial_items: vec![
                OutcomeItem::new("d_1", "Students enhance their digital skills"),
                OutcomeItem::new("d_2", "Students learn to use productivity tools effectively"),
                OutcomeItem::new("d_3", "Curriculum is updated with modern digital practices"),
                OutcomeItem::new("d_4", "Faculty participation in digital training increases by 20%"),
            ],
        }
    }

    pub fn indirect_outcomes() -> Self {
        Self {
            style: OutcomeStyle {
                title: "Indirect outcomes".into(),
                subtitle: "What we contribute over time".into(),
                footer_text: "Zone of indirect influence".into(),
                footer_background: BRAND,
                footer_foreground: Rgb::WHITE,
                border_color: BRAND,
            },
            initial_items: vec![
                OutcomeItem::new("i_1", "internships to youth."),
                OutcomeItem::new("i_2", "Indirect outcome as an example"),
                OutcomeItem::new("i_3", "Another example outcome here."),
                OutcomeItem::new("i_4", "A final indirect contribution."),
            ],
        }
    }

    pub fn ultimate_impact() -> Self {
        Self {
            style: OutcomeStyle {
                title: "Ultimate impact".into(),
                subtitle: "The lasting change we seek".into(),
                footer_text: "Zone of contribution".into(),
                footer_background: BRAND,
                footer_foreground: Rgb::WHITE,
                border_color: BRAND,
            },
            initial_items: vec![
                OutcomeItem::new("u_5", "higher youth engagement."),
                OutcomeItem::new("u_6", "Employability rates increase across the region."),
                OutcomeItem::new("u_7", "Long-term change in community structure."),
            ],
        }
    }

    pub fn for_kind(kind: OutcomeKind) -> Self {
        match kind {
            OutcomeKind::Direct => Self::direct_outcomes(),
            OutcomeKind::Indirect => Self::indirect_outcomes(),
            OutcomeKind::Ultimate => Self::ultimate_impact(),
        }
    }
}

#[derive(Debug)]
pub struct OutcomeList {
    kind: OutcomeKind,
    style: OutcomeStyle,
    list: EditableList<OutcomeItem>,
    expanded: bool,
}

impl OutcomeList {
    pub fn new(kind: OutcomeKind, config: OutcomeListConfig, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            kind,
            style: config.style,
            list: EditableList::with_items(kind.id_prefix(), ids, config.initial_items),
            expanded: false,
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&[OutcomeItem]) + 'static) {
        self.list.subscribe(listener);
    }

    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    pub fn style(&self) -> &OutcomeStyle {
        &self.style
    }

    pub fn items(&self) -> &[OutcomeItem] {
        self.list.items()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn visible(&self) -> &[OutcomeItem] {
        let items = self.list.items();
        if self.expanded {
            items
        } else {
            &items[..items.len().min(VISIBLE_WINDOW)]
        }
    }

    pub fn shows_toggle(&self) -> bool {
        self.len() > VISIBLE_WINDOW
    }

    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn is_highlighted(&self, index: usize) -> bool {
        self.kind.highlighted_index() == Some(index) && index < self.visible().len()
    }

    pub fn add(&mut self, text: &str) -> Option<EntryId> {
        let id = self.list.add(text)?;
        self.expanded = true;
        Some(id)
    }

    pub fn delete(&mut self, id: &EntryId) -> bool {
        self.list.delete(id)
    }
}

impl Backed for OutcomeList {
    type Entry = OutcomeItem;

    fn entries(&self) -> &EditableList<OutcomeItem> {
        &self.list
    }

    fn entries_mut(&mut self) -> &mut EditableList<OutcomeItem> {
        &mut self.list
    }
}

#[cfg(test)]
#[path = "tests/outcome_list_tests.rs"]
mod tests;
