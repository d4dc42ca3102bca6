//! Tab-separated frame output.

use beatframe::{Band, Frame};

const FIELDS: [&str; 5] = ["val", "avg", "delta", "trend", "hit"];

pub fn header(with_spectrum: bool) -> String {
    let mut columns = vec!["t".to_string()];
    for band in Band::ALL {
        columns.extend(FIELDS.iter().map(|field| format!("{}.{}", band.name(), field)));
    }
    if with_spectrum {
        columns.push("spectrum".to_string());
    }
    columns.join("\t")
}

pub fn format_frame(frame: &Frame) -> String {
    let mut columns = vec![format!("{:.1}", frame.t)];
    for band in Band::ALL {
        match frame.reading(band) {
            Some(r) => columns.extend([
                format!("{:.4}", r.val),
                format!("{:.4}", r.avg),
                format!("{:.4}", r.delta),
                format!("{:.4}", r.trend),
                (if r.hit { "1" } else { "0" }).to_string(),
            ]),
            None => columns.extend(FIELDS.iter().map(|_| "-".to_string())),
        }
    }
    if !frame.spectrum.is_empty() {
        let buckets: Vec<String> = frame.spectrum.iter().map(|v| format!("{:.3}", v)).collect();
        columns.push(buckets.join(","));
    }
    columns.join("\t")
}
