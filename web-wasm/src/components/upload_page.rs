//! アップロード画面

use crate::api;
use crate::app::Navigator;
use event_gallery_common::media::format_size;
use event_gallery_common::{check_submittable, select_files, Page, UploadCandidate, UploadStatus};
use gloo::timers::callback::Timeout;
use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::{File, FileList};

/// 成功表示から "Ready to upload more files!" に戻すまで
const STATUS_RESET_MS: u32 = 5_000;

/// ブラウザで選ばれたファイル
#[derive(Clone)]
struct SelectedFile {
    file: File,
    candidate: UploadCandidate,
}

impl SelectedFile {
    fn new(file: File) -> Self {
        let candidate = UploadCandidate::new(file.name(), file.type_(), file.size() as u64);
        Self { file, candidate }
    }
}

impl AsRef<UploadCandidate> for SelectedFile {
    fn as_ref(&self) -> &UploadCandidate {
        &self.candidate
    }
}

fn collect_files(list: FileList) -> Vec<SelectedFile> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(SelectedFile::new)
        .collect()
}

#[component]
pub fn UploadPage() -> impl IntoView {
    let nav = expect_context::<Navigator>();

    let (name, set_name) = signal(String::new());
    let files = RwSignal::new_local(Vec::<SelectedFile>::new());
    let status = RwSignal::new(UploadStatus::Idle);
    let file_input: NodeRef<html::Input> = NodeRef::new();
    let reset_timer = StoredValue::new_local(None::<Timeout>);

    let cancel_reset = move || {
        reset_timer.try_update_value(|t| {
            t.take();
        });
    };

    let clear_input = move || {
        if let Some(input) = file_input.try_get_untracked().flatten() {
            input.set_value("");
        }
    };

    let on_select = move |_: ev::Event| {
        cancel_reset();
        let picked = file_input
            .get_untracked()
            .and_then(|input| input.files())
            .map(collect_files)
            .unwrap_or_default();

        match select_files(picked) {
            Ok(selected) if selected.is_empty() => {
                files.set(Vec::new());
                status.set(UploadStatus::Idle);
            }
            Ok(selected) => {
                status.set(UploadStatus::Selected {
                    count: selected.len(),
                    first_name: selected[0].candidate.file_name.clone(),
                });
                files.set(selected);
            }
            Err(report) => {
                // 1件でも大きすぎれば選択ごと捨てる
                files.set(Vec::new());
                clear_input();
                status.set(UploadStatus::Rejected(report));
            }
        }
    };

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if status.get_untracked().is_busy() {
            return;
        }
        cancel_reset();

        let selected = files.get_untracked();
        if let Err(e) = check_submittable(&selected) {
            status.set(UploadStatus::Failed(e));
            return;
        }
        status.set(UploadStatus::Uploading);

        let uploader = name.get_untracked();
        spawn_local(async move {
            let blobs: Vec<File> = selected.iter().map(|f| f.file.clone()).collect();
            match api::upload(&blobs, &uploader).await {
                Ok(()) => {
                    files.try_set(Vec::new());
                    set_name.try_set(String::new());
                    clear_input();
                    status.try_set(UploadStatus::Succeeded(blobs.len()));

                    let timer = Timeout::new(STATUS_RESET_MS, move || {
                        status.try_update(|s| {
                            if matches!(s, UploadStatus::Succeeded(_)) {
                                *s = UploadStatus::ReadyForMore;
                            }
                        });
                    });
                    reset_timer.try_update_value(|t| *t = Some(timer));
                }
                Err(e) => {
                    leptos::logging::warn!("upload failed: {}", e);
                    status.try_set(UploadStatus::Failed(e));
                }
            }
        });
    };

    on_cleanup(move || cancel_reset());

    let is_busy = move || status.with(|s| s.is_busy());

    view! {
        <div class="upload-page-container">
            <div class="upload-container">
                <h1 class="upload-title">
                    "Welcome to " <span>"#MJALWAYS&FOREVER"</span>
                </h1>
                <p class="upload-description">"Share your wedding photos and videos with us! 📸💍"</p>

                <div class="file-size-info">
                    <p>"📁 Maximum file sizes:"</p>
                    <ul>
                        <li>"📸 Images: 10MB (JPG, PNG, GIF)"</li>
                        <li>"🎥 Videos: 100MB (MP4, MOV, AVI)"</li>
                    </ul>
                </div>

                <form class="upload-form" on:submit=on_submit>
                    <input
                        type="text"
                        class="upload-input-text"
                        placeholder="Your Name (optional)"
                        prop:value=move || name.get()
                        on:input=move |ev| set_name.set(event_target_value(&ev))
                    />
                    <input
                        type="file"
                        class="upload-input-file"
                        accept="image/*,video/*"
                        multiple=true
                        node_ref=file_input
                        on:change=on_select
                    />

                    <Show when=move || files.with(|f| !f.is_empty())>
                        <div class="selected-files">
                            <p>"Selected files:"</p>
                            <ul>
                                {move || files.with(|f| {
                                    f.iter()
                                        .map(|f| {
                                            let label = format!(
                                                "{} ({})",
                                                f.candidate.file_name,
                                                format_size(f.candidate.size),
                                            );
                                            view! { <li>{label}</li> }
                                        })
                                        .collect_view()
                                })}
                            </ul>
                        </div>
                    </Show>

                    <button
                        type="submit"
                        class="upload-button"
                        disabled=move || is_busy() || files.with(|f| f.is_empty())
                    >
                        {move || if is_busy() { "⏳ Uploading..." } else { "📤 Upload" }}
                    </button>
                </form>

                <p class=move || format!("upload-status {}", status.with(|s| s.tone()))>
                    {move || status.get().to_string()}
                </p>

                <button class="gallery-link" on:click=move |_| nav.go(Page::Gallery)>
                    "View Private Gallery"
                </button>
            </div>
        </div>
    }
}
