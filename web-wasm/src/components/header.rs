//! ヘッダーコンポーネント

use leptos::prelude::*;

#[component]
pub fn Header() -> impl IntoView {
    view! {
        <header class="header">
            <h1><i class="fas fa-book-open"></i>" Validator Referensi"</h1>
            <p class="subtitle">"Validasi format, kelengkapan, dan indeksasi daftar pustaka"</p>
        </header>
    }
}
