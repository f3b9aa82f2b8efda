//! Alignment flags for placing text inside a target box

use bitflags::bitflags;

bitflags! {
    /// Horizontal and vertical alignment bitmask. The raw bits are part
    /// of the render request fingerprint, so their values are stable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Align: u32 {
        const LEFT = 1;
        const RIGHT = 2;
        const H_CENTER = 4;
        const TOP = 8;
        const BOTTOM = 16;
        const V_CENTER = 32;

        const TOP_LEFT = Self::TOP.bits() | Self::LEFT.bits();
        const CENTER = Self::H_CENTER.bits() | Self::V_CENTER.bits();
    }
}

impl Align {
    /// X offset for content of width `w` inside a box of width `box_w`.
    /// Left alignment (or no horizontal flag) pins to 0.
    pub fn offset_x(self, box_w: i32, w: i32) -> i32 {
        if self.contains(Align::RIGHT) {
            box_w - w
        } else if self.contains(Align::H_CENTER) {
            (box_w - w) / 2
        } else {
            0
        }
    }

    /// Y offset for content of height `h` inside a box of height `box_h`.
    pub fn offset_y(self, box_h: i32, h: i32) -> i32 {
        if self.contains(Align::BOTTOM) {
            box_h - h
        } else if self.contains(Align::V_CENTER) {
            (box_h - h) / 2
        } else {
            0
        }
    }
}

impl Default for Align {
    fn default() -> Self {
        Align::TOP_LEFT
    }
}
