//! Property tests for tile coordinate math.

use ocean_common::tile::{latlon_to_tile, lonlat_to_pixel, tile_bbox};
use ocean_common::TileCoord;

/// For every valid (z, x, y), converting to a bbox and re-deriving the tile
/// from the bbox center must round-trip to the original index.
#[test]
fn tile_bbox_center_round_trips() {
    for z in 0..=8u32 {
        let n = 2u32.pow(z);
        // Sample corners, edges, and a spread of interior tiles
        let candidates: Vec<u32> = [0, 1, n / 4, n / 2, n.saturating_sub(2), n - 1]
            .iter()
            .copied()
            .filter(|&v| v < n)
            .collect();

        for &x in &candidates {
            for &y in &candidates {
                let coord = TileCoord::new(z, x, y);
                let bbox = tile_bbox(&coord);
                let (lon, lat) = bbox.center();
                let back = latlon_to_tile(lat, lon, z);
                assert_eq!(back, coord, "round trip failed at z={} x={} y={}", z, x, y);
            }
        }
    }
}

#[test]
fn tile_bbox_is_always_ordered_and_bounded() {
    for z in 0..=6u32 {
        let n = 2u32.pow(z);
        for y in 0..n {
            for x in [0, n / 2, n - 1] {
                let bbox = tile_bbox(&TileCoord::new(z, x, y));
                assert!(bbox.west < bbox.east, "west < east at z={} x={} y={}", z, x, y);
                assert!(bbox.south < bbox.north, "south < north at z={} x={} y={}", z, x, y);
                assert!(bbox.north <= 90.0);
                assert!(bbox.south >= -90.0);
            }
        }
    }
}

#[test]
fn adjacent_tiles_share_edges() {
    let a = tile_bbox(&TileCoord::new(7, 36, 48));
    let b = tile_bbox(&TileCoord::new(7, 37, 48));
    let below = tile_bbox(&TileCoord::new(7, 36, 49));

    assert!((a.east - b.west).abs() < 1e-9);
    assert!((a.south - below.north).abs() < 1e-9);
}

#[test]
fn pixel_location_lands_inside_named_tile() {
    for &(lon, lat) in &[
        (-75.5, 35.2),
        (0.0, 0.0),
        (-179.9, 80.0),
        (179.9, -80.0),
        (12.3, -45.6),
    ] {
        for z in [3u32, 6, 10] {
            let px = lonlat_to_pixel(lon, lat, z, 256);
            assert!(px.tile.is_valid());
            assert!(px.i < 256 && px.j < 256);

            let bbox = tile_bbox(&px.tile);
            assert!(
                bbox.contains_point(lon, lat.clamp(bbox.south, bbox.north)),
                "point ({}, {}) not in tile bbox at z={}",
                lon,
                lat,
                z
            );
        }
    }
}
