use glam::Vec2;

/// A discrete camera movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

impl MoveDirection {
    pub const ALL: [MoveDirection; 4] = [
        MoveDirection::Forward,
        MoveDirection::Backward,
        MoveDirection::Left,
        MoveDirection::Right,
    ];

    fn bit(self) -> u8 {
        match self {
            MoveDirection::Forward => 1,
            MoveDirection::Backward => 1 << 1,
            MoveDirection::Left => 1 << 2,
            MoveDirection::Right => 1 << 3,
        }
    }
}

/// A high-level action produced from raw window input.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Begin holding a movement key.
    Move(MoveDirection),
    /// Release a movement key.
    Stop(MoveDirection),
    /// Look by a pixel delta. Positive y looks up.
    Look(Vec2),
    /// Scroll by a number of lines. Positive zooms in.
    Zoom(f32),
    /// Leave the frame loop.
    Exit,
}

/// Movement directions currently held down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldMoves(u8);

impl HeldMoves {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, dir: MoveDirection) {
        self.0 |= dir.bit();
    }

    pub fn release(&mut self, dir: MoveDirection) {
        self.0 &= !dir.bit();
    }

    pub fn is_held(&self, dir: MoveDirection) -> bool {
        self.0 & dir.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Drop every held direction, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Held directions in forward, backward, left, right order.
    pub fn iter(&self) -> impl Iterator<Item = MoveDirection> + '_ {
        MoveDirection::ALL
            .into_iter()
            .filter(move |dir| self.is_held(*dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut held = HeldMoves::new();
        assert!(held.is_empty());
        held.press(MoveDirection::Left);
        assert!(held.is_held(MoveDirection::Left));
        assert!(!held.is_held(MoveDirection::Right));
        held.release(MoveDirection::Left);
        assert!(held.is_empty());
    }

    #[test]
    fn repeated_press_is_idempotent() {
        let mut held = HeldMoves::new();
        held.press(MoveDirection::Forward);
        held.press(MoveDirection::Forward);
        held.release(MoveDirection::Forward);
        assert!(held.is_empty());
    }

    #[test]
    fn iteration_order_is_fixed() {
        let mut held = HeldMoves::new();
        held.press(MoveDirection::Right);
        held.press(MoveDirection::Forward);
        held.press(MoveDirection::Left);
        let dirs: Vec<_> = held.iter().collect();
        assert_eq!(
            dirs,
            vec![
                MoveDirection::Forward,
                MoveDirection::Left,
                MoveDirection::Right
            ]
        );
    }

    #[test]
    fn clear_drops_everything() {
        let mut held = HeldMoves::new();
        for dir in MoveDirection::ALL {
            held.press(dir);
        }
        held.clear();
        assert_eq!(held.iter().count(), 0);
    }

    #[test]
    fn action_look_carries_delta() {
        let a = Action::Look(Vec2::new(3.0, -1.0));
        assert!(matches!(a, Action::Look(d) if d.x == 3.0 && d.y == -1.0));
    }
}
