use chrono::{DateTime, Local};
use common::dispatch::{Carrier, OutgoingEvent};
use common::payload::{Field, NotificationPayload};

fn clock(epoch_ms: Option<i64>) -> String {
    epoch_ms
        .and_then(DateTime::from_timestamp_millis)
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".into())
}

fn line(
    id: Option<i32>,
    package: Option<&str>,
    posted: Option<i64>,
    title: Option<&str>,
    content: Option<&str>,
    can_reply: bool,
) -> String {
    let mut out = format!(
        "[{}] {} {}",
        id.map_or_else(|| "?".into(), |id| id.to_string()),
        clock(posted),
        package.unwrap_or("unknown"),
    );
    match (title, content) {
        (Some(title), Some(content)) => out.push_str(&format!(": {title} - {content}")),
        (Some(text), None) | (None, Some(text)) => out.push_str(&format!(": {text}")),
        (None, None) => {}
    }
    if can_reply {
        out.push_str(" (reply)");
    }
    out
}

pub fn payload_line(payload: &NotificationPayload) -> String {
    line(
        payload.id(),
        payload.str(Field::PackageName),
        payload.long(Field::PostedAtEpochMs),
        payload.str(Field::Title),
        payload.str(Field::Content),
        payload.bool(Field::CanReply).unwrap_or(false),
    )
}

pub fn event_line(event: &OutgoingEvent) -> String {
    let str_of = |field: Field| match event.get(field.as_ref()) {
        Some(Carrier::Str(s)) => Some(s.as_str()),
        _ => None,
    };
    let id = match event.get(Field::Id.as_ref()) {
        Some(Carrier::Int(id)) => Some(*id),
        _ => None,
    };
    let posted = match event.get(Field::PostedAtEpochMs.as_ref()) {
        Some(Carrier::Long(ms)) => Some(*ms),
        _ => None,
    };
    let flag = |field: Field| matches!(event.get(field.as_ref()), Some(Carrier::Bool(true)));

    let marker = if flag(Field::IsRemoved) { '-' } else { '+' };
    format!(
        "{marker} {}",
        line(
            id,
            str_of(Field::PackageName),
            posted,
            str_of(Field::Title),
            str_of(Field::Content),
            flag(Field::CanReply),
        )
    )
}
