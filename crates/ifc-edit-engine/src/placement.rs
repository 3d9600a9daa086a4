// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Absolute placement of products
//!
//! Composes an `IfcLocalPlacement` with every ancestor it is placed relative
//! to, yielding a world transform.

use ifc_edit_model::{DecodedEntity, EntityId, EntityResolver, IfcType};
use nalgebra::{Matrix4, Point3, Vector3};
use rustc_hash::FxHashSet;

/// `ObjectPlacement` slot of an `IfcProduct`
const OBJECT_PLACEMENT: usize = 5;

/// Placement entity referenced by a product, if any
pub fn object_placement<S: EntityResolver + ?Sized>(
    store: &S,
    entity: &DecodedEntity,
) -> Option<EntityId> {
    let placement_id = entity.get_ref(OBJECT_PLACEMENT)?;
    let placement = store.get(placement_id)?;
    (placement.ifc_type == IfcType::IfcLocalPlacement).then_some(placement_id)
}

/// Absolute transform of a local placement chain
///
/// Unresolvable links contribute the identity. A cycle in `PlacementRelTo`
/// stops the walk at the repeated placement.
pub fn absolute_placement<S: EntityResolver + ?Sized>(
    store: &S,
    placement_id: EntityId,
) -> Matrix4<f64> {
    let mut chain = Vec::new();
    let mut visited = FxHashSet::default();
    let mut current = Some(placement_id);

    while let Some(id) = current {
        if !visited.insert(id) {
            log::warn!("Placement cycle detected at {}", id);
            break;
        }
        let Some(placement) = store.get(id) else {
            log::warn!("Dangling placement reference {}", id);
            break;
        };
        if placement.ifc_type != IfcType::IfcLocalPlacement {
            break;
        }
        // RelativePlacement at index 1
        let local = placement
            .get_ref(1)
            .and_then(|axis| resolve_axis_placement(store, axis))
            .unwrap_or_else(Matrix4::identity);
        chain.push(local);
        // PlacementRelTo at index 0
        current = placement.get_ref(0);
    }

    chain
        .into_iter()
        .rev()
        .fold(Matrix4::identity(), |world, local| world * local)
}

/// Row-major nested rendering of a transform
pub fn matrix_rows(matrix: &Matrix4<f64>) -> Vec<Vec<f64>> {
    (0..4)
        .map(|row| (0..4).map(|col| clean(matrix[(row, col)])).collect())
        .collect()
}

/// Avoid `-0` in rendered output
fn clean(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Resolve an IfcAxis2Placement3D or IfcAxis2Placement2D to a transform
fn resolve_axis_placement<S: EntityResolver + ?Sized>(
    store: &S,
    placement_id: EntityId,
) -> Option<Matrix4<f64>> {
    let placement = store.get(placement_id)?;

    // Location (index 0)
    let location = placement
        .get_ref(0)
        .and_then(|id| resolve_cartesian_point(store, id))
        .unwrap_or_else(Point3::origin);

    let (axis, ref_dir) = match placement.ifc_type {
        // Axis (index 1), RefDirection (index 2)
        IfcType::IfcAxis2Placement3D => (
            placement
                .get_ref(1)
                .and_then(|id| resolve_direction(store, id))
                .unwrap_or_else(Vector3::z),
            placement
                .get_ref(2)
                .and_then(|id| resolve_direction(store, id))
                .unwrap_or_else(Vector3::x),
        ),
        // RefDirection (index 1)
        IfcType::IfcAxis2Placement2D => (
            Vector3::z(),
            placement
                .get_ref(1)
                .and_then(|id| resolve_direction(store, id))
                .unwrap_or_else(Vector3::x),
        ),
        _ => return None,
    };

    let mut matrix = basis(&axis, &ref_dir).unwrap_or_else(|| {
        log::warn!("Degenerate axes on placement {}", placement_id);
        Matrix4::identity()
    });
    matrix[(0, 3)] = location.x;
    matrix[(1, 3)] = location.y;
    matrix[(2, 3)] = location.z;
    Some(matrix)
}

/// Orthonormal rotation with Z along `axis` and X as close to `ref_dir` as possible
fn basis(axis: &Vector3<f64>, ref_dir: &Vector3<f64>) -> Option<Matrix4<f64>> {
    let z = axis.try_normalize(1e-12)?;
    let x = ref_dir.try_normalize(1e-12)?;
    let y = z.cross(&x).try_normalize(1e-12)?;
    let x = y.cross(&z).normalize();

    Some(Matrix4::new(
        x.x, y.x, z.x, 0.0, x.y, y.y, z.y, 0.0, x.z, y.z, z.z, 0.0, 0.0, 0.0, 0.0, 1.0,
    ))
}

/// Resolve an IfcCartesianPoint to a Point3
fn resolve_cartesian_point<S: EntityResolver + ?Sized>(
    store: &S,
    point_id: EntityId,
) -> Option<Point3<f64>> {
    let point = store.get(point_id)?;
    if point.ifc_type != IfcType::IfcCartesianPoint {
        return None;
    }

    // Coordinates at index 0
    let coords = point.get_list(0)?;
    let at = |i: usize| coords.get(i).and_then(|v| v.as_float()).unwrap_or(0.0);
    Some(Point3::new(at(0), at(1), at(2)))
}

/// Resolve an IfcDirection to a Vector3
fn resolve_direction<S: EntityResolver + ?Sized>(
    store: &S,
    dir_id: EntityId,
) -> Option<Vector3<f64>> {
    let direction = store.get(dir_id)?;
    if direction.ifc_type != IfcType::IfcDirection {
        return None;
    }

    // DirectionRatios at index 0; 2D directions have no Z
    let ratios = direction.get_list(0)?;
    let at = |i: usize| ratios.get(i).and_then(|v| v.as_float()).unwrap_or(0.0);
    Some(Vector3::new(at(0), at(1), at(2)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample;
    use approx::assert_relative_eq;
    use ifc_edit_parser::StepDocument;

    #[test]
    fn test_rotated_wall_placement() {
        let doc = sample();
        let wall = doc.get(EntityId(42)).unwrap();
        let placement = object_placement(&doc, &wall).unwrap();
        let matrix = absolute_placement(&doc, placement);

        let expected = Matrix4::new(
            0.0, -1.0, 0.0, 1000.0, 1.0, 0.0, 0.0, 2000.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
        );
        assert_relative_eq!(matrix, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_rows_and_missing_placement() {
        let doc = sample();
        let slab = doc.get(EntityId(44)).unwrap();
        let matrix = absolute_placement(&doc, object_placement(&doc, &slab).unwrap());
        let rows = matrix_rows(&matrix);
        assert_eq!(rows[2], vec![0.0, 0.0, 1.0, 3000.0]);
        assert_eq!(rows[3], vec![0.0, 0.0, 0.0, 1.0]);

        let door = doc.get(EntityId(45)).unwrap();
        assert_eq!(object_placement(&doc, &door), None);
    }

    #[test]
    fn test_cycle_terminates() {
        let content = r#"ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCCARTESIANPOINT((5.,0.,0.));
#2=IFCAXIS2PLACEMENT3D(#1,$,$);
#3=IFCLOCALPLACEMENT(#4,#2);
#4=IFCLOCALPLACEMENT(#3,#2);
ENDSEC;
END-ISO-10303-21;
"#;
        let doc = StepDocument::parse(content).unwrap();
        let matrix = absolute_placement(&doc, EntityId(3));
        assert_relative_eq!(matrix[(0, 3)], 10.0);
    }
}
