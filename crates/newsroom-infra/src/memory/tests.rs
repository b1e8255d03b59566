use std::sync::Arc;

use chrono::{TimeDelta, Utc};

use newsroom_core::domain::{Author, Category, Comment, JobExecution, JobOutcome, Post, PostFilter, PostKind, User};
use newsroom_core::error::DomainError;
use newsroom_core::ports::{
    BaseRepository, CategoryRepository, JobExecutionRepository, PostRepository,
};
use newsroom_core::services::{
    AccountService, DigestService, JobHistoryService, NewAccount, NotificationDispatcher,
    PostChanges, PostDraft, ProfileChanges, PublishingService, RatingService,
};

use crate::mail::RecordingMailer;
use crate::template::TemplateRegistry;

use super::{
    InMemoryAuthorRepository, InMemoryCategoryRepository, InMemoryCommentRepository,
    InMemoryJobExecutionRepository, InMemoryPostRepository, InMemoryStore,
    InMemoryUserRepository,
};

struct Harness {
    users: Arc<InMemoryUserRepository>,
    authors: Arc<InMemoryAuthorRepository>,
    categories: Arc<InMemoryCategoryRepository>,
    posts: Arc<InMemoryPostRepository>,
    comments: Arc<InMemoryCommentRepository>,
    executions: Arc<InMemoryJobExecutionRepository>,
    mailer: Arc<RecordingMailer>,
    rating: RatingService,
    accounts: AccountService,
    publishing: PublishingService,
    digest: DigestService,
    history: JobHistoryService,
}

fn harness() -> Harness {
    let store = InMemoryStore::new();
    let users = Arc::new(InMemoryUserRepository::new(store.clone()));
    let authors = Arc::new(InMemoryAuthorRepository::new(store.clone()));
    let categories = Arc::new(InMemoryCategoryRepository::new(store.clone()));
    let posts = Arc::new(InMemoryPostRepository::new(store.clone()));
    let comments = Arc::new(InMemoryCommentRepository::new(store.clone()));
    let executions = Arc::new(InMemoryJobExecutionRepository::new(store));
    let mailer = Arc::new(RecordingMailer::new());
    let renderer = Arc::new(TemplateRegistry::with_defaults());

    let dispatcher = Arc::new(NotificationDispatcher::new(
        categories.clone(),
        posts.clone(),
        renderer,
        mailer.clone(),
    ));

    Harness {
        rating: RatingService::new(authors.clone(), posts.clone(), comments.clone()),
        accounts: AccountService::new(
            users.clone(),
            authors.clone(),
            categories.clone(),
            dispatcher.clone(),
        ),
        publishing: PublishingService::new(posts.clone(), authors.clone(), dispatcher.clone()),
        digest: DigestService::new(posts.clone(), dispatcher),
        history: JobHistoryService::new(executions.clone()),
        users,
        authors,
        categories,
        posts,
        comments,
        executions,
        mailer,
    }
}

async fn seed_user(h: &Harness, name: &str) -> User {
    h.users
        .save(User::new(
            name.to_string(),
            format!("{name}@example.com"),
            "hash".to_string(),
        ))
        .await
        .unwrap()
}

async fn seed_author(h: &Harness, name: &str) -> (User, Author) {
    let user = seed_user(h, name).await;
    let author = h.authors.save(Author::new(user.id)).await.unwrap();
    (user, author)
}

async fn seed_post(h: &Harness, author: &Author, rating: i32) -> Post {
    let mut post = Post::new(
        author.id,
        PostKind::News,
        "headline".to_string(),
        "body text".to_string(),
    );
    post.rating = rating;
    h.posts.save(post).await.unwrap()
}

async fn seed_category(h: &Harness, name: &str) -> Category {
    h.categories
        .save(Category::new(name.to_string()))
        .await
        .unwrap()
}

fn draft(author: &Author, category_ids: Vec<uuid::Uuid>) -> PostDraft {
    PostDraft {
        author_id: author.id,
        kind: PostKind::News,
        title: "fresh headline".to_string(),
        content: "fresh body".to_string(),
        category_ids,
    }
}

// --- rating engine ---

#[tokio::test]
async fn author_with_no_activity_rates_zero() {
    let h = harness();
    let (_, author) = seed_author(&h, "alice").await;

    assert_eq!(h.rating.recompute_author_rating(author.id).await.unwrap(), 0);
}

#[tokio::test]
async fn recompute_applies_three_term_formula() {
    let h = harness();
    let (user, author) = seed_author(&h, "alice").await;
    let (_, other_author) = seed_author(&h, "bob").await;
    let commenter = seed_user(&h, "carol").await;

    // posts {2, -1}
    let post_a = seed_post(&h, &author, 2).await;
    seed_post(&h, &author, -1).await;
    // alice's own comments {3}, left on bob's post
    let bobs_post = seed_post(&h, &other_author, 0).await;
    let mut own = Comment::new(bobs_post.id, user.id, "mine".to_string());
    own.rating = 3;
    h.comments.save(own).await.unwrap();
    // comments on alice's posts {1, 1}
    for _ in 0..2 {
        let mut received = Comment::new(post_a.id, commenter.id, "theirs".to_string());
        received.rating = 1;
        h.comments.save(received).await.unwrap();
    }

    // 3*(2-1) + 3 + (1+1)
    assert_eq!(h.rating.recompute_author_rating(author.id).await.unwrap(), 8);

    let persisted = h.authors.find_by_id(author.id).await.unwrap().unwrap();
    assert_eq!(persisted.rating, 8);
}

#[tokio::test]
async fn recompute_unknown_author_is_not_found() {
    let h = harness();
    let err = h
        .rating
        .recompute_author_rating(uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn like_then_dislike_restores_post_rating() {
    let h = harness();
    let (_, author) = seed_author(&h, "alice").await;
    let post = seed_post(&h, &author, 5).await;

    h.rating.like_post(post.id).await.unwrap();
    h.rating.dislike_post(post.id).await.unwrap();

    let current = h.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(current.rating, 5);
}

#[tokio::test]
async fn like_then_dislike_restores_comment_rating() {
    let h = harness();
    let (user, author) = seed_author(&h, "alice").await;
    let post = seed_post(&h, &author, 0).await;
    let comment = h
        .comments
        .save(Comment::new(post.id, user.id, "hm".to_string()))
        .await
        .unwrap();

    h.rating.like_comment(comment.id).await.unwrap();
    h.rating.dislike_comment(comment.id).await.unwrap();

    let current = h.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(current.rating, 0);
}

#[tokio::test]
async fn likes_do_not_touch_the_author_rating() {
    let h = harness();
    let (_, author) = seed_author(&h, "alice").await;
    let post = seed_post(&h, &author, 0).await;

    h.rating.like_post(post.id).await.unwrap();

    // Derived value stays stale until an explicit recomputation.
    let persisted = h.authors.find_by_id(author.id).await.unwrap().unwrap();
    assert_eq!(persisted.rating, 0);
}

// --- publication policy ---

#[tokio::test]
async fn fourth_post_within_24h_is_rejected() {
    let h = harness();
    let (_, author) = seed_author(&h, "alice").await;
    for _ in 0..3 {
        seed_post(&h, &author, 0).await;
    }

    let err = h
        .publishing
        .publish(draft(&author, vec![]), Utc::now())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::QuotaExceeded { posted: 3, .. }));
    // Nothing persisted, nothing sent.
    assert_eq!(h.posts.find_by_author(author.id).await.unwrap().len(), 3);
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn third_post_within_24h_is_allowed() {
    let h = harness();
    let (_, author) = seed_author(&h, "alice").await;
    for _ in 0..2 {
        seed_post(&h, &author, 0).await;
    }

    h.publishing
        .publish(draft(&author, vec![]), Utc::now())
        .await
        .unwrap();

    assert_eq!(h.posts.find_by_author(author.id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn posts_older_than_the_window_do_not_count() {
    let h = harness();
    let (_, author) = seed_author(&h, "alice").await;
    for _ in 0..2 {
        seed_post(&h, &author, 0).await;
    }
    let mut stale = Post::new(author.id, PostKind::News, "old".to_string(), "old".to_string());
    stale.created_at = Utc::now() - TimeDelta::hours(25);
    h.posts.save(stale).await.unwrap();

    h.publishing
        .publish(draft(&author, vec![]), Utc::now())
        .await
        .unwrap();
}

// --- notification fan-out ---

#[tokio::test]
async fn publish_notifies_one_message_per_category_subscriber_pair() {
    let h = harness();
    let (_, author) = seed_author(&h, "alice").await;
    let rust_cat = seed_category(&h, "rust").await;
    let go_cat = seed_category(&h, "go").await;
    let bob = seed_user(&h, "bob").await;
    let carol = seed_user(&h, "carol").await;
    h.categories.add_subscriber(rust_cat.id, bob.id).await.unwrap();
    h.categories.add_subscriber(go_cat.id, carol.id).await.unwrap();

    h.publishing
        .publish(draft(&author, vec![rust_cat.id, go_cat.id]), Utc::now())
        .await
        .unwrap();

    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(h.mailer.sent_to("bob@example.com").len(), 1);
    assert_eq!(h.mailer.sent_to("carol@example.com").len(), 1);
}

#[tokio::test]
async fn subscriber_of_both_categories_gets_two_messages() {
    let h = harness();
    let (_, author) = seed_author(&h, "alice").await;
    let rust_cat = seed_category(&h, "rust").await;
    let go_cat = seed_category(&h, "go").await;
    let bob = seed_user(&h, "bob").await;
    h.categories.add_subscriber(rust_cat.id, bob.id).await.unwrap();
    h.categories.add_subscriber(go_cat.id, bob.id).await.unwrap();

    h.publishing
        .publish(draft(&author, vec![rust_cat.id, go_cat.id]), Utc::now())
        .await
        .unwrap();

    assert_eq!(h.mailer.sent_to("bob@example.com").len(), 2);
}

#[tokio::test]
async fn one_failed_delivery_does_not_block_the_rest() {
    let h = harness();
    let (_, author) = seed_author(&h, "alice").await;
    let cat = seed_category(&h, "rust").await;
    let bob = seed_user(&h, "bob").await;
    let carol = seed_user(&h, "carol").await;
    h.categories.add_subscriber(cat.id, bob.id).await.unwrap();
    h.categories.add_subscriber(cat.id, carol.id).await.unwrap();
    h.mailer.fail_for("bob@example.com");

    let post = h
        .publishing
        .publish(draft(&author, vec![cat.id]), Utc::now())
        .await
        .unwrap();

    // The post survives the failure and the other recipient is reached.
    assert!(h.posts.find_by_id(post.id).await.unwrap().is_some());
    assert_eq!(h.mailer.sent_to("carol@example.com").len(), 1);
    assert!(h.mailer.sent_to("bob@example.com").is_empty());
}

#[tokio::test]
async fn notification_preview_is_first_50_chars_of_content() {
    let h = harness();
    let (_, author) = seed_author(&h, "alice").await;
    let cat = seed_category(&h, "rust").await;
    let bob = seed_user(&h, "bob").await;
    h.categories.add_subscriber(cat.id, bob.id).await.unwrap();

    let mut long_draft = draft(&author, vec![cat.id]);
    long_draft.content = "z".repeat(300);
    h.publishing.publish(long_draft, Utc::now()).await.unwrap();

    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text_body.chars().count(), 50);
}

#[tokio::test]
async fn editing_a_post_never_renotifies() {
    let h = harness();
    let (_, author) = seed_author(&h, "alice").await;
    let cat = seed_category(&h, "rust").await;
    let bob = seed_user(&h, "bob").await;
    h.categories.add_subscriber(cat.id, bob.id).await.unwrap();

    let post = h
        .publishing
        .publish(draft(&author, vec![cat.id]), Utc::now())
        .await
        .unwrap();
    let after_publish = h.mailer.sent().len();

    h.publishing
        .edit(
            post.id,
            PostChanges {
                title: Some("revised headline".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(h.mailer.sent().len(), after_publish);
}

// --- accounts ---

#[tokio::test]
async fn registration_sends_exactly_one_welcome() {
    let h = harness();

    let user = h
        .accounts
        .register(NewAccount {
            username: "dave".to_string(),
            email: "dave@example.com".to_string(),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap();

    let sent = h.mailer.sent_to("dave@example.com");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Welcome to Newsroom");

    // A later profile update is silent.
    h.accounts
        .update_profile(
            user.id,
            ProfileChanges {
                username: Some("david".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(h.mailer.sent().len(), 1);
}

#[tokio::test]
async fn duplicate_email_registration_is_rejected() {
    let h = harness();
    seed_user(&h, "dave").await;

    let err = h
        .accounts
        .register(NewAccount {
            username: "other".to_string(),
            email: "dave@example.com".to_string(),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Duplicate(_)));
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn subscribing_confirms_to_the_subscriber_only() {
    let h = harness();
    let cat = seed_category(&h, "rust").await;
    let bob = seed_user(&h, "bob").await;
    let carol = seed_user(&h, "carol").await;
    h.categories.add_subscriber(cat.id, carol.id).await.unwrap();

    h.accounts.subscribe(bob.id, cat.id).await.unwrap();

    assert!(h.categories.is_subscriber(cat.id, bob.id).await.unwrap());
    assert_eq!(h.mailer.sent_to("bob@example.com").len(), 1);
    assert!(h.mailer.sent_to("carol@example.com").is_empty());
}

#[tokio::test]
async fn upgrade_to_author_is_idempotent() {
    let h = harness();
    let bob = seed_user(&h, "bob").await;

    let first = h.accounts.upgrade_to_author(bob.id).await.unwrap();
    let second = h.accounts.upgrade_to_author(bob.id).await.unwrap();

    assert_eq!(first.id, second.id);
    let user = h.users.find_by_id(bob.id).await.unwrap().unwrap();
    assert!(user.is_author);
}

// --- search ---

#[tokio::test]
async fn search_title_is_case_insensitive_substring() {
    let h = harness();
    let (_, author) = seed_author(&h, "alice").await;
    for title in ["React tips", "Angular update", "Why preACT matters"] {
        let post = Post::new(author.id, PostKind::Article, title.to_string(), "b".to_string());
        h.posts.save(post).await.unwrap();
    }

    let found = h
        .posts
        .search(&PostFilter {
            title: Some("react".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn search_filters_combine_with_and_semantics() {
    let h = harness();
    let (_, alice) = seed_author(&h, "alice").await;
    let (_, bob) = seed_author(&h, "bobby").await;

    let mut old = Post::new(alice.id, PostKind::News, "rust news".to_string(), "b".to_string());
    old.created_at = Utc::now() - TimeDelta::days(10);
    h.posts.save(old).await.unwrap();
    seed_post(&h, &bob, 0).await;
    let mut hit = Post::new(alice.id, PostKind::News, "more rust news".to_string(), "b".to_string());
    hit.created_at = Utc::now() - TimeDelta::days(1);
    let hit = h.posts.save(hit).await.unwrap();

    let found = h
        .posts
        .search(&PostFilter {
            title: Some("rust".to_string()),
            author_username: Some("ALI".to_string()),
            created_after: Some(Utc::now() - TimeDelta::days(5)),
        })
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, hit.id);
}

#[tokio::test]
async fn created_after_is_strictly_greater_than() {
    let h = harness();
    let (_, author) = seed_author(&h, "alice").await;
    let post = seed_post(&h, &author, 0).await;

    let found = h
        .posts
        .search(&PostFilter {
            created_after: Some(post.created_at),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(found.is_empty());
}

// --- scheduled jobs ---

#[tokio::test]
async fn weekly_digest_resends_recent_posts() {
    let h = harness();
    let (_, author) = seed_author(&h, "alice").await;
    let cat = seed_category(&h, "rust").await;
    let bob = seed_user(&h, "bob").await;
    h.categories.add_subscriber(cat.id, bob.id).await.unwrap();

    let post = seed_post(&h, &author, 0).await;
    h.posts.set_categories(post.id, &[cat.id]).await.unwrap();

    let mut stale = Post::new(author.id, PostKind::News, "old".to_string(), "old".to_string());
    stale.created_at = Utc::now() - TimeDelta::days(30);
    let stale = h.posts.save(stale).await.unwrap();
    h.posts.set_categories(stale.id, &[cat.id]).await.unwrap();

    let summary = h.digest.send_weekly_digest(Utc::now()).await.unwrap();

    assert_eq!(summary.posts, 1);
    assert_eq!(summary.sent, 1);
    assert_eq!(h.mailer.sent_to("bob@example.com").len(), 1);
}

#[tokio::test]
async fn purge_removes_only_executions_past_retention() {
    let h = harness();

    let mut old = JobExecution::new("weekly_digest", Utc::now(), JobOutcome::Success, None);
    old.finished_at = Utc::now() - TimeDelta::days(8);
    h.executions.record(old).await.unwrap();
    h.executions
        .record(JobExecution::new(
            "weekly_digest",
            Utc::now(),
            JobOutcome::Success,
            None,
        ))
        .await
        .unwrap();

    let purged = h.history.purge(Utc::now()).await.unwrap();

    assert_eq!(purged, 1);
    assert_eq!(h.executions.all().await.len(), 1);
}
