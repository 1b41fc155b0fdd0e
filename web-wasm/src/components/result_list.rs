//! 結果タブと参考文献一覧コンポーネント
//!
//! フィルタ切り替えは保持している結果セットから再描画するだけ（再問い合わせしない）

use leptos::prelude::*;
use reference_validator_common::view::{CitationState, QuartileView};
use reference_validator_common::{ReferenceView, ResultFilter};

use crate::actions;
use crate::app::use_app;

const NO_DETAILS: &str = "Tidak ada hasil detail yang tersedia.";

#[component]
pub fn ResultList() -> impl IntoView {
    let session = use_app().session;
    let views = move || session.with(|s| s.visible_results());
    let has_any = move || session.with(|s| s.results().is_some_and(|r| !r.results.is_empty()));

    view! {
        <div class="detailed-results">
            <ResultTabs />
            <Show when=has_any fallback=|| view! { <p>{NO_DETAILS}</p> }>
                <For
                    each=views
                    key=|view| (view.number, view.text.clone())
                    children=move |view| view! { <ReferenceItem reference=view /> }
                />
            </Show>
        </div>
    }
}

#[component]
fn ResultTabs() -> impl IntoView {
    let session = use_app().session;
    let counts = move || session.with(|s| s.tab_counts());

    view! {
        <div class="tabs">
            {ResultFilter::TABS
                .into_iter()
                .map(|filter| {
                    let active = move || session.with(|s| s.filter() == filter);
                    view! {
                        <button
                            class=move || if active() { "tab-button active" } else { "tab-button" }
                            data-filter=filter.as_str()
                            on:click=move |_| session.update(|s| s.set_filter(filter))
                        >
                            {filter.label()}
                            " ("
                            <span class="tab-count">{move || counts().get(filter)}</span>
                            ")"
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}

#[component]
fn ReferenceItem(reference: ReferenceView) -> impl IntoView {
    let ctx = use_app();
    let number = reference.number;
    let can_download = reference.can_download_citation();

    let badges = reference
        .badges
        .into_iter()
        .map(|badge| {
            let class = format!("validation-badge {}", badge.class());
            view! { <div class=class>{badge.label}</div> }
        })
        .collect_view();

    let links = reference
        .links
        .into_iter()
        .map(|link| {
            view! {
                <p class="meta-info">
                    <strong>{link.label}":"</strong>" "
                    <a href=link.url target="_blank" rel="noopener noreferrer" class="verification-link">
                        {link.text}" "<i class="fas fa-external-link-alt"></i>
                    </a>
                </p>
            }
        })
        .collect_view();

    let quartile = reference.quartile.map(|quartile| match quartile {
        QuartileView::Tag { label, class } => view! {
            <p class="meta-info"><strong>"Kuartil:"</strong>" "<span class=class>{label}</span></p>
        }
        .into_any(),
        QuartileView::Unavailable(text) => view! {
            <p class="meta-info"><strong>"Kuartil:"</strong>" "{text}</p>
        }
        .into_any(),
    });

    let citation_note = match reference.citation {
        CitationState::Partial { warning } => Some(view! {
            <p class="bibtex-warning">
                <i class="fas fa-exclamation-triangle"></i>" "
                {warning.unwrap_or_else(|| "BibTeX tidak lengkap".to_string())}
            </p>
        }),
        CitationState::Complete | CitationState::Unavailable => None,
    };

    view! {
        <div class=format!("reference-item {}", reference.status_class)>
            <div class=format!("reference-status status-{}", reference.status_class)>
                <i class=reference.status_icon></i>" "{reference.heading}
            </div>
            <div class="reference-text">{reference.text}</div>

            <div class="details-grid">{badges}</div>

            <p class="meta-info"><strong>"Sumber Terdeteksi:"</strong>" "{reference.source}</p>
            <p class="meta-info"><strong>"Jenis Terdeteksi:"</strong>" "{reference.reference_type}</p>

            {links}
            {quartile}

            <div class="feedback"><i class="fas fa-comment-alt"></i>" "{reference.feedback}</div>

            {citation_note}
            <Show when=move || can_download>
                <button class="btn btn-small" on:click=move |_| actions::download_citation(ctx, number)>
                    <i class="fas fa-download"></i>" Unduh BibTeX"
                </button>
                {move || {
                    ctx.session
                        .with(|s| s.citation_error(number).map(str::to_string))
                        .map(|message| view! { <p class="error-message citation-error">{message}</p> })
                }}
            </Show>
        </div>
    }
}
