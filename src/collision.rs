//! Axis-aligned hitboxes and the overlap test shared by every collision
//! pass in the engine.

/// A box with its origin at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect { x, y, width, height }
    }

    pub fn centre(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Anything that occupies space on the field.
pub trait HasHitbox {
    fn hitbox(&self) -> Rect;
}

impl HasHitbox for Rect {
    fn hitbox(&self) -> Rect {
        *self
    }
}

/// Strict overlap: boxes that only share an edge do not collide.
pub fn overlaps<A, B>(a: &A, b: &B) -> bool
where
    A: HasHitbox + ?Sized,
    B: HasHitbox + ?Sized,
{
    let a = a.hitbox();
    let b = b.hitbox();
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}
