use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use std::process::Command;

fn lastrans() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lastrans"));
    cmd.env_remove("RUST_LOG");
    cmd
}

const TRANSLATION: &str = "1 0 0 10\n0 1 0 20\n0 0 1 30\n0 0 0 1\n";

fn write_las(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = las::Builder::from((1, 2));
    builder.point_format = las::point::Format::new(0)?;
    let header = builder.into_header()?;

    let mut writer = las::Writer::from_path(path, header)?;
    writer.write_point(las::Point {
        x: 1.0,
        y: 2.0,
        z: 3.0,
        return_number: 1,
        number_of_returns: 1,
        ..Default::default()
    })?;
    writer.close()?;
    Ok(())
}

#[test]
fn test_help_exits_with_failure() -> Result<(), Box<dyn std::error::Error>> {
    let out = lastrans().arg("--help").output()?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("--transform"));
    Ok(())
}

#[test]
fn test_missing_transform_prints_usage() -> Result<(), Box<dyn std::error::Error>> {
    let out = lastrans().args(["in.las", "out.las"]).output()?;
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("-t trans.txt"));
    assert!(stderr.contains("Usage"));
    Ok(())
}

#[test]
fn test_empty_transform_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let transform = dir.path().join("trans.txt");
    std::fs::write(&transform, "")?;

    let out = lastrans()
        .arg("-t")
        .arg(&transform)
        .arg(dir.path().join("in.las"))
        .arg(dir.path().join("out.las"))
        .output()?;
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("trans.txt"));
    assert!(stderr.contains("empty"));
    Ok(())
}

#[test]
fn test_transform_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("in.las");
    let output = dir.path().join("out.las");
    let transform = dir.path().join("trans.txt");
    write_las(&input)?;
    std::fs::write(&transform, TRANSLATION)?;

    let status = lastrans()
        .arg("-t")
        .arg(&transform)
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .status()?;
    assert!(status.success());

    let mut reader = las::Reader::from_path(&output)?;
    let points = reader.points().collect::<Result<Vec<_>, _>>()?;
    assert_eq!(points.len(), 1);
    assert!((points[0].x - 11.0).abs() < 1e-6);
    assert!((points[0].y - 22.0).abs() < 1e-6);
    assert!((points[0].z - 33.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_verbose_logs_points_and_timing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("in.las");
    let output = dir.path().join("out.las");
    let transform = dir.path().join("trans.txt");
    write_las(&input)?;
    std::fs::write(&transform, TRANSLATION)?;

    let quiet = lastrans()
        .arg("-t")
        .arg(&transform)
        .arg(&input)
        .arg(&output)
        .output()?;
    assert!(quiet.status.success());
    assert!(!String::from_utf8_lossy(&quiet.stderr).contains("after: 0:"));

    let out = lastrans()
        .arg("-v")
        .arg("-t")
        .arg(&transform)
        .arg(&input)
        .arg(&output)
        .output()?;
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("after: 0: X"));
    assert!(stderr.contains("total time"));
    assert!(!stderr.contains("after: 1:"));
    Ok(())
}

#[test]
fn test_transform_stdin_to_stdout() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("in.las");
    let transform = dir.path().join("trans.txt");
    write_las(&input)?;
    std::fs::write(&transform, TRANSLATION)?;

    let out = lastrans()
        .arg("-t")
        .arg(&transform)
        .args(["-i", "-", "-o", "-"])
        .stdin(File::open(&input)?)
        .output()?;
    assert!(out.status.success());

    let mut reader = las::Reader::new(Cursor::new(out.stdout))?;
    assert_eq!(reader.header().number_of_points(), 1);
    let bounds = reader.header().bounds();
    assert!((bounds.min.x - 11.0).abs() < 1e-6);
    assert!((bounds.max.z - 33.0).abs() < 1e-6);

    let points = reader.points().collect::<Result<Vec<_>, _>>()?;
    assert_eq!(points.len(), 1);
    assert!((points[0].x - 11.0).abs() < 1e-6);
    assert!((points[0].y - 22.0).abs() < 1e-6);
    assert!((points[0].z - 33.0).abs() < 1e-6);
    assert_eq!(points[0].return_number, 1);
    Ok(())
}
