use glam::IVec2;

/// Reference corner or edge of the parent that an element's position is
/// measured from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Corner {
    #[default]
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
    Bottom,
    Top,
    Fill,
    Center,
}

/// Size and absolute origin of whatever an element is laid out against:
/// its parent container, or the viewport for the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ParentFrame {
    pub size: IVec2,
    pub origin: IVec2,
}

pub(crate) const UNBOUNDED: IVec2 = IVec2::splat(i32::MAX);

#[derive(Clone, Debug)]
pub(crate) struct ElementCore {
    pub position: IVec2,
    pub size: IVec2,
    pub min_size: IVec2,
    pub max_size: IVec2,
    pub anchor: Corner,
    pub corrected_position: IVec2,
}

impl ElementCore {
    pub fn new(position: IVec2, size: IVec2, anchor: Corner) -> Self {
        let mut core = Self {
            position,
            size: IVec2::ZERO,
            min_size: IVec2::ZERO,
            max_size: UNBOUNDED,
            anchor,
            corrected_position: position,
        };
        core.set_size(size);
        core
    }

    /// Stores `size` clamped component-wise to `[min_size, max_size]`.
    pub fn set_size(&mut self, size: IVec2) {
        self.size = size.max(self.min_size).min(self.max_size);
    }

    pub fn set_min_size(&mut self, min_size: IVec2) {
        self.min_size = min_size.max(IVec2::ZERO);
        self.max_size = self.max_size.max(self.min_size);
        self.set_size(self.size);
    }

    pub fn set_max_size(&mut self, max_size: IVec2) {
        self.max_size = max_size.max(self.min_size);
        self.set_size(self.size);
    }

    /// Recomputes `corrected_position` from the anchor rules. `Fill`
    /// additionally overwrites the size with the frame's size.
    pub fn resolve(&mut self, frame: ParentFrame) {
        let p = self.position;
        let s = self.size;
        let ps = frame.size;
        let centered_x = ps.x / 2 - s.x / 2 + p.x;

        let local = match self.anchor {
            Corner::BottomLeft => p,
            Corner::TopLeft => IVec2::new(p.x, ps.y - p.y - s.y),
            Corner::BottomRight => IVec2::new(ps.x - p.x - s.x, p.y),
            Corner::TopRight => IVec2::new(ps.x - p.x - s.x, ps.y - p.y - s.y),
            Corner::Bottom => IVec2::new(centered_x, p.y),
            Corner::Top => IVec2::new(centered_x, ps.y - p.y - s.y),
            Corner::Center => IVec2::new(centered_x, ps.y / 2 - s.y / 2 + p.y),
            Corner::Fill => {
                self.set_size(ps);
                IVec2::ZERO
            }
        };
        self.corrected_position = local + frame.origin;
    }

    /// Inclusive point-in-rectangle test in bottom-left-origin space.
    pub fn contains(&self, point: IVec2) -> bool {
        let min = self.corrected_position;
        let max = min.saturating_add(self.size);
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}

#[cfg(test)]
mod tests {
    use super::{Corner, ElementCore, ParentFrame};
    use glam::IVec2;

    const FRAME: ParentFrame = ParentFrame {
        size: IVec2::new(400, 300),
        origin: IVec2::new(10, 20),
    };

    fn resolved(anchor: Corner) -> IVec2 {
        let mut core = ElementCore::new(IVec2::new(5, 7), IVec2::new(100, 50), anchor);
        core.resolve(FRAME);
        core.corrected_position
    }

    #[test]
    fn anchors_map_to_bottom_left_origin() {
        assert_eq!(resolved(Corner::BottomLeft), IVec2::new(15, 27));
        assert_eq!(resolved(Corner::TopLeft), IVec2::new(15, 263));
        assert_eq!(resolved(Corner::BottomRight), IVec2::new(305, 27));
        assert_eq!(resolved(Corner::TopRight), IVec2::new(305, 263));
        assert_eq!(resolved(Corner::Bottom), IVec2::new(165, 27));
        assert_eq!(resolved(Corner::Top), IVec2::new(165, 263));
        assert_eq!(resolved(Corner::Center), IVec2::new(165, 152));
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        for anchor in [
            Corner::BottomLeft,
            Corner::TopRight,
            Corner::Center,
            Corner::Fill,
        ] {
            let mut core = ElementCore::new(IVec2::new(3, 4), IVec2::new(20, 30), anchor);
            core.resolve(FRAME);
            let first = (core.corrected_position, core.size);
            core.resolve(FRAME);
            assert_eq!((core.corrected_position, core.size), first);
        }
    }

    #[test]
    fn fill_takes_parent_size_and_origin() {
        let mut core = ElementCore::new(IVec2::new(50, 50), IVec2::new(1, 1), Corner::Fill);
        core.resolve(FRAME);
        assert_eq!(core.size, FRAME.size);
        assert_eq!(core.corrected_position, FRAME.origin);
    }

    #[test]
    fn size_is_clamped_for_any_request() {
        let mut core = ElementCore::new(IVec2::ZERO, IVec2::new(-40, 10), Corner::BottomLeft);
        assert_eq!(core.size, IVec2::new(0, 10));

        core.set_min_size(IVec2::new(20, 20));
        assert_eq!(core.size, IVec2::new(20, 20));
        core.set_max_size(IVec2::new(50, 60));
        core.set_size(IVec2::new(i32::MAX, -5));
        assert_eq!(core.size, IVec2::new(50, 20));
    }

    #[test]
    fn contains_uses_inclusive_bounds() {
        let mut core = ElementCore::new(IVec2::new(10, 10), IVec2::new(20, 20), Corner::BottomLeft);
        core.resolve(ParentFrame {
            size: IVec2::new(100, 100),
            origin: IVec2::ZERO,
        });
        assert!(core.contains(IVec2::new(10, 10)));
        assert!(core.contains(IVec2::new(30, 30)));
        assert!(!core.contains(IVec2::new(31, 30)));
    }
}
