//! Per-frame light submissions.
//!
//! Lights are collected alongside draws and cleared on every
//! [`RenderQueue::clear`](crate::RenderQueue::clear). A forward consumer asks
//! [`LightList::lights_affecting`] which of them can reach an object.

use glam::Vec3;
use strata_core::geometry::BoundingSphere;

use crate::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: Color,
    pub ambient_factor: f32,
    pub diffuse_factor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub radius: f32,
    pub color: Color,
    pub ambient_factor: f32,
    pub diffuse_factor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub radius: f32,
    /// Half-angles of the cone, in radians.
    pub inner_angle: f32,
    pub outer_angle: f32,
    pub color: Color,
    pub ambient_factor: f32,
    pub diffuse_factor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

/// A light selected for an object: `index` points into the list of its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightIndex {
    pub kind: LightKind,
    pub index: usize,
    /// Lower is more relevant.
    pub score: f32,
}

#[derive(Debug, Clone, Default)]
pub struct LightList {
    pub directional: Vec<DirectionalLight>,
    pub point: Vec<PointLight>,
    pub spot: Vec<SpotLight>,
}

impl LightList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.directional.len() + self.point.len() + self.spot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.directional.clear();
        self.point.clear();
        self.spot.clear();
    }

    /// Lights whose influence reaches `object`, most relevant first.
    ///
    /// Directional lights reach everything and score 0; point and spot
    /// lights score their squared distance to the object's center.
    pub fn lights_affecting(
        &self,
        object: &BoundingSphere,
        include_directional: bool,
    ) -> Vec<LightIndex> {
        let mut selected = Vec::new();

        if include_directional {
            selected.extend((0..self.directional.len()).map(|index| LightIndex {
                kind: LightKind::Directional,
                index,
                score: 0.0,
            }));
        }

        let reaches = |position: Vec3, radius: f32| {
            object.intersects(&BoundingSphere::new(position, radius * radius))
        };

        for (index, light) in self.point.iter().enumerate() {
            if reaches(light.position, light.radius) {
                selected.push(LightIndex {
                    kind: LightKind::Point,
                    index,
                    score: light.position.distance_squared(object.center),
                });
            }
        }

        for (index, light) in self.spot.iter().enumerate() {
            if reaches(light.position, light.radius) {
                selected.push(LightIndex {
                    kind: LightKind::Spot,
                    index,
                    score: light.position.distance_squared(object.center),
                });
            }
        }

        selected.sort_by(|a, b| a.score.total_cmp(&b.score));
        selected
    }
}
