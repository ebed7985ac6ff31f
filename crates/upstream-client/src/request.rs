//! Upstream request URL construction.
//!
//! Three request shapes: WMTS GetTile (by tile index), WMS GetMap (by
//! bounding box, honoring the provider's declared axis order), and WMTS
//! GetFeatureInfo (single-pixel value query). Credentials never appear in
//! URLs; authentication is attached as headers by the client.

use ocean_common::{
    AxisOrder, BoundingBox, LayerSpec, OceanError, TileCoord, TilePixel, UpstreamProtocol,
};
use reqwest::Url;

/// Build a WMTS GetTile URL for one tile at one time.
pub fn get_tile_url(
    spec: &LayerSpec,
    tile: &TileCoord,
    time_token: &str,
) -> Result<Url, OceanError> {
    let mut pairs = vec![
        ("SERVICE".to_string(), "WMTS".to_string()),
        ("REQUEST".to_string(), "GetTile".to_string()),
        ("VERSION".to_string(), "1.0.0".to_string()),
        ("LAYER".to_string(), spec.layer_path.clone()),
        ("STYLE".to_string(), spec.style.clone()),
        ("FORMAT".to_string(), spec.format.clone()),
        ("TILEMATRIXSET".to_string(), spec.matrix_set.clone()),
        ("TILEMATRIX".to_string(), tile.z.to_string()),
        ("TILEROW".to_string(), tile.y.to_string()),
        ("TILECOL".to_string(), tile.x.to_string()),
        ("time".to_string(), time_token.to_string()),
    ];
    push_elevation(&mut pairs, spec);
    build_url(spec, &pairs)
}

/// Build a WMS GetMap URL for a bounding box.
///
/// The bbox is serialized in the axis order the provider declares in its
/// LayerSpec; a mismatch silently mirrors the image, so this is never
/// hardcoded.
pub fn get_map_url(
    spec: &LayerSpec,
    bbox: &BoundingBox,
    width: u32,
    height: u32,
    time_token: &str,
) -> Result<Url, OceanError> {
    let lat_first = matches!(spec.axis_order, AxisOrder::LatLon);
    let mut pairs = vec![
        ("SERVICE".to_string(), "WMS".to_string()),
        ("REQUEST".to_string(), "GetMap".to_string()),
        ("VERSION".to_string(), "1.3.0".to_string()),
        ("LAYERS".to_string(), spec.layer_path.clone()),
        ("STYLES".to_string(), spec.style.clone()),
        ("FORMAT".to_string(), spec.format.clone()),
        ("CRS".to_string(), "CRS:84".to_string()),
        ("BBOX".to_string(), bbox.to_axis_ordered_string(lat_first)),
        ("WIDTH".to_string(), width.to_string()),
        ("HEIGHT".to_string(), height.to_string()),
        ("TRANSPARENT".to_string(), "true".to_string()),
        ("TIME".to_string(), time_token.to_string()),
    ];
    push_elevation(&mut pairs, spec);
    build_url(spec, &pairs)
}

/// Build a WMTS GetFeatureInfo URL for a single pixel.
/// Used both for availability probing and for point sampling.
pub fn get_feature_info_url(
    spec: &LayerSpec,
    point: &TilePixel,
    time_token: &str,
) -> Result<Url, OceanError> {
    let mut pairs = vec![
        ("SERVICE".to_string(), "WMTS".to_string()),
        ("REQUEST".to_string(), "GetFeatureInfo".to_string()),
        ("VERSION".to_string(), "1.0.0".to_string()),
        ("LAYER".to_string(), spec.layer_path.clone()),
        ("TILEMATRIXSET".to_string(), spec.matrix_set.clone()),
        ("TILEMATRIX".to_string(), point.tile.z.to_string()),
        ("TILEROW".to_string(), point.tile.y.to_string()),
        ("TILECOL".to_string(), point.tile.x.to_string()),
        ("I".to_string(), point.i.to_string()),
        ("J".to_string(), point.j.to_string()),
        ("INFOFORMAT".to_string(), "application/json".to_string()),
        ("time".to_string(), time_token.to_string()),
    ];
    push_elevation(&mut pairs, spec);
    build_url(spec, &pairs)
}

/// The image request URL for this layer's protocol: GetTile for WMTS
/// providers, GetMap over the tile's bbox for WMS providers.
pub fn image_request_url(
    spec: &LayerSpec,
    tile: &TileCoord,
    tile_size: u32,
    time_token: &str,
) -> Result<Url, OceanError> {
    match spec.protocol {
        UpstreamProtocol::Wmts => get_tile_url(spec, tile, time_token),
        UpstreamProtocol::Wms => {
            let bbox = ocean_common::tile::tile_bbox(tile);
            get_map_url(spec, &bbox, tile_size, tile_size, time_token)
        }
    }
}

fn build_url(spec: &LayerSpec, pairs: &[(String, String)]) -> Result<Url, OceanError> {
    let mut url = Url::parse(&spec.endpoint)
        .map_err(|e| OceanError::Config(format!("bad endpoint for layer {}: {}", spec.id, e)))?;
    url.query_pairs_mut()
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    Ok(url)
}

fn push_elevation(pairs: &mut Vec<(String, String)>, spec: &LayerSpec) {
    if spec.supports_elevation {
        if let Some(elev) = spec.default_elevation {
            pairs.push(("elevation".to_string(), elev.to_string()));
        }
    }
}
