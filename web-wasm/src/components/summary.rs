//! 集計・推奨事項コンポーネント

use leptos::prelude::*;
use reference_validator_common::view::{recommendation_items, summary_tiles};

use crate::app::use_app;

#[component]
pub fn SummaryGrid() -> impl IntoView {
    let session = use_app().session;
    let tiles = move || {
        session.with(|s| {
            s.results()
                .map(|r| summary_tiles(&r.summary))
                .unwrap_or_default()
        })
    };

    view! {
        <div class="summary-grid">
            {move || {
                tiles()
                    .into_iter()
                    .map(|tile| {
                        view! {
                            <div class=format!("summary-item {}", tile.tone.class())>
                                <div class="summary-number">{tile.value}</div>
                                <div class="summary-label">{tile.label}</div>
                            </div>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}

#[component]
pub fn Recommendations() -> impl IntoView {
    let session = use_app().session;
    let items = move || {
        session.with(|s| {
            let recommendations = s.results().map(|r| r.recommendations.as_slice()).unwrap_or(&[]);
            recommendation_items(recommendations)
        })
    };

    view! {
        <div class="recommendations">
            <h3><i class="fas fa-lightbulb"></i>" Rekomendasi"</h3>
            <ul>
                {move || items().into_iter().map(|item| view! { <li>{item}</li> }).collect_view()}
            </ul>
        </div>
    }
}
