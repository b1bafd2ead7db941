use image::{GrayImage, Luma};
use laserline::core::ImageError;
use laserline::track::{
    gray_image_from_slice, track_laser_line, track_laser_line_from_gray_u8,
    track_laser_line_in_roi, Roi, TrackImageError,
};
use laserline::{TrackStart, TrackingFailure, TrackingParameters, TrackingStatus};

const WIDTH: u32 = 300;
const HEIGHT: u32 = 50;

/// 3 px line from (10, 10) to (290, 20) with a short ramp over columns
/// 96..101, drawn at `offset` into a `width x height` image.
fn seam_image(width: u32, height: u32, offset: (u32, u32)) -> GrayImage {
    let mut img = GrayImage::from_pixel(width, height, Luma([100]));
    let (x1, x2) = (96u32, 101u32);
    for x in 10..=290u32 {
        let y = if x <= x1 {
            10
        } else if x >= x2 {
            20
        } else {
            10 + 10 * (x - x1) / (x2 - x1)
        };
        for yy in y - 1..=y + 1 {
            img.put_pixel(x + offset.0, yy + offset.1, Luma([180]));
        }
    }
    img
}

fn params() -> TrackingParameters {
    TrackingParameters {
        threshold: 101,
        track_start: TrackStart::FromLeft,
        averaging_x: 1,
        averaging_y: 1,
        double_tracking: false,
        start_area_x: 1,
        start_area_y: 1,
        ..TrackingParameters::default()
    }
}

#[test]
fn whole_image_report_matches_tracker() {
    let img = seam_image(WIDTH, HEIGHT, (0, 0));
    let report = track_laser_line(&img, params()).expect("tracking");

    assert_eq!(report.status, TrackingStatus::Complete);
    assert_eq!(report.legacy_code, 0);
    assert!(report.is_valid);
    assert_eq!(report.valid_range, Some(10..=291));
    assert_eq!(report.passes.len(), 1);
    assert_eq!(report.overlay.len(), 282);
    assert_eq!(report.overlay[0], [10.0, 11.0]);

    assert_eq!(report.profile.len(), WIDTH as usize);
    assert_eq!(report.profile.values[100], 18.0);
    assert_eq!(report.profile.ranks[100], 255);
    assert_eq!(report.profile.values[5], -1.0);
}

#[test]
fn roi_report_is_in_image_coordinates() {
    let img = seam_image(WIDTH + 40, HEIGHT + 20, (16, 7));
    let roi = Roi {
        x: 16,
        y: 7,
        width: WIDTH,
        height: HEIGHT,
    };
    let report = track_laser_line_in_roi(&img, roi, params()).expect("tracking");

    assert_eq!(report.status, TrackingStatus::Complete);
    assert_eq!(report.valid_range, Some(10..=291));
    assert_eq!(report.overlay.len(), 282);
    assert_eq!(report.overlay[0], [26.0, 18.0]);
}

#[test]
fn roi_outside_image_is_rejected() {
    let img = seam_image(WIDTH, HEIGHT, (0, 0));
    let roi = Roi {
        x: 200,
        y: 0,
        width: WIDTH,
        height: HEIGHT,
    };
    let err = track_laser_line_in_roi(&img, roi, params()).unwrap_err();
    assert!(matches!(err, TrackImageError::Image(ImageError::OutOfBounds)));
}

#[test]
fn dark_frame_reports_no_line() {
    let img = GrayImage::from_pixel(WIDTH, HEIGHT, Luma([0]));
    let err = track_laser_line(&img, params()).unwrap_err();
    assert!(matches!(
        err,
        TrackImageError::Tracking(TrackingFailure::NoLine)
    ));
}

#[test]
fn raw_buffer_helpers_validate_length() {
    let err = gray_image_from_slice(4, 4, &[0u8; 15]).unwrap_err();
    assert!(matches!(
        err,
        TrackImageError::InvalidGrayBuffer {
            expected: 16,
            got: 15
        }
    ));

    let small = gray_image_from_slice(3, 2, &[1, 2, 3, 4, 5, 6]).expect("exact length");
    assert_eq!(small.get_pixel(2, 1).0, [6]);

    let img = seam_image(WIDTH, HEIGHT, (0, 0));
    let report =
        track_laser_line_from_gray_u8(WIDTH, HEIGHT, img.as_raw(), params()).expect("tracking");
    assert_eq!(report.valid_range, Some(10..=291));
}

#[test]
fn too_small_image_fails_before_tracking() {
    let img = seam_image(WIDTH, HEIGHT, (0, 0));
    let err = track_laser_line_from_gray_u8(WIDTH, 2, &img.as_raw()[..2 * WIDTH as usize], params())
        .unwrap_err();
    assert!(matches!(
        err,
        TrackImageError::Tracking(TrackingFailure::RoiTooSmall {
            width: 300,
            height: 2
        })
    ));
}

#[test]
fn report_serializes_to_json_file() {
    let img = seam_image(WIDTH, HEIGHT, (0, 0));
    let report = track_laser_line(&img, params()).expect("tracking");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("report.json");
    std::fs::write(&path, serde_json::to_string_pretty(&report).expect("json")).expect("write");

    let raw = std::fs::read_to_string(&path).expect("read");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("parse");
    assert_eq!(value["status"]["status"], "complete");
    assert_eq!(value["legacy_code"], 0);
    assert_eq!(value["valid_range"]["start"], 10);
    assert_eq!(value["valid_range"]["end"], 291);
    assert_eq!(value["passes"][0]["direction"], "left_to_right");
    assert_eq!(value["profile"]["values"].as_array().map(Vec::len), Some(300));
}
