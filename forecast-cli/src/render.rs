use forecast_core::View;

/// Text for one view. `Idle` renders as nothing.
pub fn render(view: &View) -> String {
    match view {
        View::Idle => String::new(),
        View::Loading => "Loading ....".to_string(),
        View::Error(message) => message.clone(),
        View::Forecast { location, days } => {
            let mut out = String::new();
            if let Some(location) = location {
                out.push_str(&location.label());
                out.push('\n');
            }
            for day in days {
                let line = format!("{}  {:<12} {}\n", day.icon, day.range, day.label);
                out.push_str(&line);
            }
            out.trim_end().to_string()
        }
    }
}

pub fn print_view(view: &View) {
    let text = render(view);
    if !text.is_empty() {
        println!("{text}");
    }
}
