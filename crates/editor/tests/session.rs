//! End-to-end tests for [`EditorSession`] and [`CoachConversation`] over a
//! scripted gateway and an in-memory store.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use canvas_core::actions::CreativeAction;
use canvas_core::image::ImageFile;
use canvas_db::repositories::project_repo::STORAGE_KEY;
use canvas_db::{KeyValueStore, MemoryStore, ProjectRepo};
use canvas_editor::coach::APOLOGY;
use canvas_editor::{CoachConversation, CoachRole, EditorSession, SessionError};
use canvas_gemini::{
    AiGateway, Coaching, CoachingError, GeminiApiError, GenerationError, SuggestionError,
};

/// Gateway that replays scripted image results and records every call.
#[derive(Default)]
struct ScriptedGateway {
    edits: Mutex<VecDeque<Result<String, GenerationError>>>,
    coaching: Mutex<VecDeque<Result<Coaching, CoachingError>>>,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl ScriptedGateway {
    fn with_edits(results: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            edits: Mutex::new(results.into()),
            ..Self::default()
        }
    }

    fn with_coaching(results: Vec<Result<Coaching, CoachingError>>) -> Self {
        Self {
            coaching: Mutex::new(results.into()),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiGateway for ScriptedGateway {
    async fn edit_image(
        &self,
        image_data: &str,
        mime_type: &str,
        instruction: &str,
    ) -> Result<String, GenerationError> {
        self.calls.lock().unwrap().push((
            image_data.to_string(),
            mime_type.to_string(),
            instruction.to_string(),
        ));
        self.edits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenerationError::NoImage))
    }

    async fn suggestions(
        &self,
        _image_data: &str,
        _mime_type: &str,
    ) -> Result<Vec<String>, SuggestionError> {
        Ok(vec!["Neon".into(), "Grain".into(), "Dragon".into()])
    }

    async fn coach_prompt(&self, draft: &str) -> Result<Coaching, CoachingError> {
        self.calls
            .lock()
            .unwrap()
            .push((String::new(), String::new(), draft.to_string()));
        self.coaching
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CoachingError::Empty))
    }
}

/// Gateway whose image edits never finish.
struct StalledGateway;

#[async_trait]
impl AiGateway for StalledGateway {
    async fn edit_image(
        &self,
        _image_data: &str,
        _mime_type: &str,
        _instruction: &str,
    ) -> Result<String, GenerationError> {
        std::future::pending().await
    }

    async fn suggestions(
        &self,
        _image_data: &str,
        _mime_type: &str,
    ) -> Result<Vec<String>, SuggestionError> {
        std::future::pending().await
    }

    async fn coach_prompt(&self, _draft: &str) -> Result<Coaching, CoachingError> {
        std::future::pending().await
    }
}

const EDIT1: &str = "data:image/png;base64,RURJVDE=";
const EDIT2: &str = "data:image/png;base64,RURJVDI=";

fn upload() -> ImageFile {
    ImageFile::new("cat.jpg", "image/jpeg", b"CATBYTES").unwrap()
}

fn edit(prompt: &str) -> CreativeAction {
    CreativeAction::Edit(prompt.to_string())
}

fn api_failure() -> GenerationError {
    GenerationError::Api(GeminiApiError::ApiError {
        status: 500,
        body: "boom".into(),
    })
}

// ---------------------------------------------------------------------------
// Test: full editing flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_edit_undo_save_reload() {
    let store = MemoryStore::new();
    let gateway = ScriptedGateway::with_edits(vec![Ok(EDIT1.into()), Ok(EDIT2.into())]);
    let mut session = EditorSession::new();

    session.upload(upload()).unwrap();
    session.apply_ai_edit(&gateway, edit("add a hat")).await.unwrap();
    session.apply_ai_edit(&gateway, CreativeAction::Remix).await.unwrap();
    session.undo();

    assert_eq!(session.current_image(), Some(EDIT1));
    assert!(session.can_redo());

    let saved = session.save(&store).unwrap();
    assert_eq!(saved.name, "cat");
    assert_eq!(saved.history, vec![EDIT1, EDIT2]);
    assert_eq!(session.project_id(), Some(saved.id.as_str()));

    let reloaded = EditorSession::open(ProjectRepo::find_by_id(&store, &saved.id).unwrap());
    assert_eq!(reloaded.history().snapshots(), [EDIT1, EDIT2]);
    assert_eq!(reloaded.history().index(), 1);
    assert_eq!(reloaded.current_image(), Some(EDIT2));
    assert_eq!(reloaded.original(), Some(&upload()));

    // The second edit ran on the first edit's output.
    let calls = gateway.calls();
    assert_eq!(calls[0].0, upload().data);
    assert_eq!(calls[0].1, "image/jpeg");
    assert!(calls[0].2.contains("\"add a hat\""));
    assert_eq!(calls[1].0, EDIT1);
    assert_eq!(calls[1].1, "image/png");
}

#[tokio::test]
async fn edit_after_undo_truncates_redo_branch() {
    let gateway = ScriptedGateway::with_edits(vec![
        Ok(EDIT1.into()),
        Ok(EDIT2.into()),
        Ok("data:image/png;base64,RURJVDM=".into()),
    ]);
    let mut session = EditorSession::new();
    session.upload(upload()).unwrap();
    session.apply_ai_edit(&gateway, CreativeAction::Expand).await.unwrap();
    session.apply_ai_edit(&gateway, CreativeAction::Expand).await.unwrap();
    session.undo();
    session.undo();

    session.apply_ai_edit(&gateway, CreativeAction::Expand).await.unwrap();

    assert_eq!(
        session.history().snapshots(),
        ["data:image/png;base64,RURJVDM="]
    );
    assert!(!session.can_redo());
    assert_eq!(gateway.calls()[2].0, upload().data);
}

#[tokio::test]
async fn resaving_updates_the_same_record() {
    let store = MemoryStore::new();
    let gateway = ScriptedGateway::with_edits(vec![Ok(EDIT1.into())]);
    let mut session = EditorSession::new();
    session.upload(upload()).unwrap();

    let first = session.save(&store).unwrap();
    session.apply_ai_edit(&gateway, CreativeAction::Remix).await.unwrap();
    session.rename("   ");
    let second = session.save(&store).unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.created_at, second.created_at);
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(second.name, "Untitled Project");
    assert_eq!(ProjectRepo::list(&store).len(), 1);
}

#[tokio::test]
async fn upload_after_open_saves_as_new_project() {
    let store = MemoryStore::new();
    let mut session = EditorSession::new();
    session.upload(upload()).unwrap();
    let first = session.save(&store).unwrap();

    let mut session = EditorSession::open(first.clone());
    session
        .upload(ImageFile::new("dog.png", "image/png", b"DOG").unwrap())
        .unwrap();
    let second = session.save(&store).unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(ProjectRepo::list(&store).len(), 2);
    assert_eq!(
        ProjectRepo::find_by_id(&store, &first.id).unwrap().original_image,
        upload()
    );
}

// ---------------------------------------------------------------------------
// Test: in-flight and failure handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_edit_is_rejected_while_one_is_pending() {
    let mut session = EditorSession::new();
    session.upload(upload()).unwrap();

    let pending = session.begin_edit(CreativeAction::Remix).unwrap();
    assert!(session.is_busy());
    assert_matches!(
        session.begin_edit(CreativeAction::Expand),
        Err(SessionError::EditInFlight)
    );

    session.complete_edit(pending, Ok(EDIT1.into())).unwrap();
    assert!(!session.is_busy());
    assert_eq!(session.history().snapshots(), [EDIT1]);
}

#[tokio::test]
async fn cursor_and_save_are_locked_while_edit_is_pending() {
    let store = MemoryStore::new();
    let gateway = ScriptedGateway::with_edits(vec![Ok(EDIT1.into()), Ok(EDIT2.into())]);
    let mut session = EditorSession::new();
    session.upload(upload()).unwrap();
    session.apply_ai_edit(&gateway, CreativeAction::Remix).await.unwrap();
    session.apply_ai_edit(&gateway, CreativeAction::Remix).await.unwrap();

    let pending = session.begin_edit(CreativeAction::Expand).unwrap();
    assert_eq!(pending.image(), EDIT2);
    assert!(!session.can_undo());

    session.undo();
    session.undo();
    session.redo();
    assert_eq!(session.history().index(), 1);
    assert_matches!(session.seek(-1), Err(SessionError::EditInFlight));
    assert_matches!(session.save(&store), Err(SessionError::EditInFlight));
    assert!(ProjectRepo::list(&store).is_empty());

    let edited = "data:image/png;base64,RURJVDJi";
    session.complete_edit(pending, Ok(edited.into())).unwrap();

    assert_eq!(session.history().snapshots(), [EDIT1, EDIT2, edited]);
    assert_eq!(session.history().index(), 2);
    assert!(session.can_undo());
    session.save(&store).unwrap();
}

#[tokio::test]
async fn dropped_edit_request_frees_the_session() {
    let mut session = EditorSession::new();
    session.upload(upload()).unwrap();

    let timed_out = tokio::time::timeout(
        Duration::from_millis(50),
        session.apply_ai_edit(&StalledGateway, CreativeAction::Remix),
    )
    .await;

    assert!(timed_out.is_err());
    assert!(!session.is_busy());
    assert!(session.history().is_empty());

    let gateway = ScriptedGateway::with_edits(vec![Ok(EDIT1.into())]);
    session.apply_ai_edit(&gateway, CreativeAction::Remix).await.unwrap();
    assert_eq!(session.history().snapshots(), [EDIT1]);
}

#[tokio::test]
async fn result_for_replaced_image_is_dropped() {
    let mut session = EditorSession::new();
    session.upload(upload()).unwrap();
    let pending = session.begin_edit(CreativeAction::Remix).unwrap();

    session
        .upload(ImageFile::new("dog.png", "image/png", b"DOG").unwrap())
        .unwrap();

    assert_matches!(
        session.complete_edit(pending, Ok(EDIT1.into())),
        Err(SessionError::StaleResult)
    );
    assert!(session.history().is_empty());
    assert_eq!(session.name(), "dog");
}

#[tokio::test]
async fn failed_generation_leaves_history_untouched() {
    let gateway = ScriptedGateway::with_edits(vec![Ok(EDIT1.into()), Err(api_failure())]);
    let mut session = EditorSession::new();
    session.upload(upload()).unwrap();
    session.apply_ai_edit(&gateway, CreativeAction::Remix).await.unwrap();

    let result = session.apply_ai_edit(&gateway, edit("make it blue")).await;

    assert_matches!(result, Err(SessionError::Generation(GenerationError::Api(_))));
    assert_eq!(session.history().snapshots(), [EDIT1]);
    assert_eq!(session.history().index(), 0);
    assert!(session
        .error()
        .unwrap()
        .starts_with("Failed to generate image:"));
    assert!(!session.is_busy());
}

#[tokio::test]
async fn missing_prompt_never_reaches_the_gateway() {
    let gateway = ScriptedGateway::default();
    let mut session = EditorSession::new();
    session.upload(upload()).unwrap();

    let result = session
        .apply_ai_edit(&gateway, CreativeAction::Emotion(String::new()))
        .await;

    assert_matches!(result, Err(SessionError::Validation(_)));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn quota_failure_keeps_session_and_stored_collection() {
    let gateway = ScriptedGateway::with_edits(vec![Ok(format!(
        "data:image/png;base64,{}",
        "A".repeat(4096)
    ))]);
    let store = MemoryStore::with_quota(2048);
    let mut session = EditorSession::new();
    session.upload(upload()).unwrap();
    let first = session.save(&store).unwrap();
    let stored_before = store.get(STORAGE_KEY).unwrap();

    session.apply_ai_edit(&gateway, CreativeAction::Remix).await.unwrap();
    let result = session.save(&store);

    assert_matches!(result, Err(SessionError::Storage(_)));
    assert!(session.error().unwrap().starts_with("Failed to save project:"));
    assert_eq!(session.history().len(), 1);
    assert_eq!(store.get(STORAGE_KEY).unwrap(), stored_before);
    assert!(ProjectRepo::find_by_id(&store, &first.id)
        .unwrap()
        .history
        .is_empty());
}

#[tokio::test]
async fn suggestions_use_current_image() {
    let gateway = ScriptedGateway::default();
    let mut session = EditorSession::new();
    assert_matches!(
        session.suggestions(&gateway).await,
        Err(SessionError::NoImage)
    );

    session.upload(upload()).unwrap();
    let ideas = session.suggestions(&gateway).await.unwrap();
    session.apply_suggestion(&ideas[1]);

    assert_eq!(session.prompt(), "Grain");
}

// ---------------------------------------------------------------------------
// Test: prompt coach
// ---------------------------------------------------------------------------

fn coaching(prompt: &str) -> Coaching {
    Coaching {
        refined_prompt: prompt.to_string(),
        tip: "Name the lighting.".to_string(),
    }
}

#[tokio::test]
async fn coach_logs_suggestion_and_tip() {
    let gateway = ScriptedGateway::with_coaching(vec![Ok(coaching("A fox at golden hour"))]);
    let mut conversation = CoachConversation::new();

    let reply = conversation.send(&gateway, "  a fox ").await.unwrap().clone();

    assert_eq!(reply.role, CoachRole::Model);
    assert_eq!(reply.tip.as_deref(), Some("Name the lighting."));
    assert_eq!(conversation.messages().len(), 3);
    assert_eq!(conversation.messages()[1].content, "a fox");
    assert_eq!(conversation.latest_suggestion(), Some("A fox at golden hour"));
}

#[tokio::test]
async fn coach_ignores_blank_input() {
    let gateway = ScriptedGateway::default();
    let mut conversation = CoachConversation::new();

    assert!(conversation.send(&gateway, "   ").await.is_none());
    assert_eq!(conversation.messages().len(), 1);
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn coach_failure_apologizes_and_try_again_replaces_it() {
    let gateway = ScriptedGateway::with_coaching(vec![
        Err(CoachingError::Empty),
        Ok(coaching("A fox in snow")),
    ]);
    let mut conversation = CoachConversation::new();

    let reply = conversation.send(&gateway, "a fox").await.unwrap();
    assert_eq!(reply.content, APOLOGY);
    assert_eq!(reply.suggestion, None);

    conversation.try_again(&gateway).await.unwrap();

    let messages = conversation.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].suggestion.as_deref(), Some("A fox in snow"));
    let drafts: Vec<_> = gateway.calls().into_iter().map(|c| c.2).collect();
    assert_eq!(drafts, vec!["a fox", "a fox"]);
}

#[tokio::test]
async fn try_again_without_user_message_is_noop() {
    let gateway = ScriptedGateway::default();
    let mut conversation = CoachConversation::new();

    assert!(conversation.try_again(&gateway).await.is_none());
    assert_eq!(conversation.messages().len(), 1);
}
