use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::json;
use tracker_domain::{Money, TransactionKind, DEFAULT_TARGET_BALANCE};

use crate::{
    backend::{paths, BackendClient, DocumentStore},
    ledger::ActivityEntry,
    AuthErrorCode, AuthFlow, AuthService, CoreError, DashboardService, DebtStanding, FixedClock,
    FriendService, LiveDashboard, MemoryBackend, ProfileService, SignUpRequest,
    TransactionService, ValidationError,
};

fn client_with_backend() -> (BackendClient, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap());
    let client = BackendClient::new(backend.clone(), backend.clone(), Arc::new(clock));
    (client, backend)
}

fn signed_up() -> (BackendClient, Arc<MemoryBackend>) {
    let (client, backend) = client_with_backend();
    AuthService::sign_up(
        &client,
        &SignUpRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "Secret12!".into(),
            phone_number: None,
        },
    )
    .expect("sign up");
    (client, backend)
}

#[test]
fn sign_up_writes_profile_with_default_target() {
    let (client, backend) = signed_up();
    let user = AuthService::current_user(&client).expect("signed in after sign up");
    let doc = backend
        .get(paths::USERS, &user.uid)
        .unwrap()
        .expect("profile document");
    assert_eq!(doc.data["name"], "Ada");
    assert_eq!(doc.data["targetBalance"], 1250.0);

    let (profile, report) = ProfileService::profile(&client).unwrap();
    assert!(report.is_clean());
    assert_eq!(profile.target_balance, DEFAULT_TARGET_BALANCE);
}

#[test]
fn sign_up_validates_before_reaching_backend() {
    let (client, backend) = client_with_backend();
    backend.set_online(false);
    let err = AuthService::sign_up(
        &client,
        &SignUpRequest {
            name: " ".into(),
            email: "ada@example.com".into(),
            password: "secret1".into(),
            phone_number: None,
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::MissingRequiredFields)
    ));
}

#[test]
fn duplicate_sign_up_maps_to_friendly_message() {
    let (client, _backend) = signed_up();
    AuthService::sign_out(&client).unwrap();
    let err = AuthService::sign_up(
        &client,
        &SignUpRequest {
            name: "Other".into(),
            email: "ada@example.com".into(),
            password: "secret1".into(),
            phone_number: None,
        },
    )
    .unwrap_err();
    assert_eq!(err.user_message(Some(AuthFlow::SignUp)), "Email already exists");
}

#[test]
fn sign_in_errors_and_last_login() {
    let (client, backend) = signed_up();
    AuthService::sign_out(&client).unwrap();
    assert!(AuthService::current_user(&client).is_none());

    let wrong = AuthService::sign_in(&client, "ada@example.com", "nope123").unwrap_err();
    assert_eq!(wrong.user_message(Some(AuthFlow::SignIn)), "Incorrect password");
    let missing = AuthService::sign_in(&client, "bob@example.com", "nope123").unwrap_err();
    assert_eq!(
        missing.user_message(Some(AuthFlow::SignIn)),
        "No account exists with this email"
    );

    backend.set_online(false);
    let offline = AuthService::sign_in(&client, "ada@example.com", "Secret12!").unwrap_err();
    assert!(matches!(
        offline,
        CoreError::Auth(AuthErrorCode::NetworkRequestFailed)
    ));
    backend.set_online(true);

    let user = AuthService::sign_in(&client, "ada@example.com", "Secret12!").unwrap();
    let doc = backend.get(paths::USERS, &user.uid).unwrap().unwrap();
    assert_eq!(doc.data["lastLogin"], json!(client.clock.now()));
}

#[test]
fn personal_ledger_accepts_only_income_and_expense() {
    let (client, _backend) = signed_up();
    let err = TransactionService::add(&client, TransactionKind::Debt, Money::from_cents(100), None)
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::WrongLedger { .. })
    ));
    let err = TransactionService::add_from_input(&client, TransactionKind::Income, "0", None)
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::InvalidAmount)
    ));
}

#[test]
fn transactions_require_a_session() {
    let (client, _backend) = client_with_backend();
    let err = TransactionService::list(&client).unwrap_err();
    assert!(matches!(err, CoreError::NotAuthenticated));
}

#[test]
fn dashboard_reflects_adds_and_removes() {
    let (client, _backend) = signed_up();
    TransactionService::add_from_input(&client, TransactionKind::Income, "100", Some("Salary"))
        .unwrap();
    let coffee =
        TransactionService::add_from_input(&client, TransactionKind::Expense, "40", None).unwrap();
    assert_eq!(coffee.description, "Expense Transaction");

    let snapshot = DashboardService::snapshot(&client, 5).unwrap();
    assert_eq!(snapshot.user_name, "Ada");
    assert_eq!(snapshot.balance.to_string(), "60.00");
    assert_eq!(snapshot.weekly_spending.buckets[1], Money::from_cents(4_000));
    assert_eq!(snapshot.monthly_expense, Money::from_cents(4_000));
    assert_eq!(snapshot.recent_activity.len(), 2);
    assert!(snapshot.progress > 0.0 && snapshot.progress < 1.0);

    TransactionService::remove(&client, &coffee.id).unwrap();
    let after = DashboardService::snapshot(&client, 5).unwrap();
    assert_eq!(after.balance, Money::from_cents(10_000));
    assert_eq!(after.weekly_spending.total(), Money::ZERO);
    assert!(matches!(
        TransactionService::remove(&client, &coffee.id),
        Err(CoreError::NotFound(_))
    ));
}

#[test]
fn dashboard_survives_malformed_documents() {
    let (client, backend) = signed_up();
    let uid = AuthService::current_user(&client).unwrap().uid;
    backend
        .add(
            &paths::transactions(&uid),
            json!({"type": "income", "amount": "abc", "date": "2024-06-01"}),
        )
        .unwrap();
    backend
        .add(
            &paths::transactions(&uid),
            json!({"type": "income", "amount": 25}),
        )
        .unwrap();

    let snapshot = DashboardService::snapshot(&client, 5).unwrap();
    assert_eq!(snapshot.balance, Money::from_cents(2_500));
    assert_eq!(snapshot.report.skipped, 1);
    assert_eq!(snapshot.report.defaulted_dates, 1);
    let entry: &ActivityEntry = &snapshot.recent_activity[0];
    assert_eq!(entry.date, client.clock.now());
}

#[test]
fn debt_ledger_reports_amount_to_receive() {
    let (client, _backend) = signed_up();
    let bob = FriendService::add_friend(&client, "  Bob ").unwrap();
    assert_eq!(bob.name, "Bob");
    FriendService::record_from_input(&client, &bob, TransactionKind::Debt, "50", None).unwrap();
    FriendService::record(
        &client,
        &bob,
        TransactionKind::Payment,
        Money::from_cents(2_000),
        Some("cash"),
    )
    .unwrap();

    let ledgers = FriendService::friends_with_ledgers(&client).unwrap().items;
    assert_eq!(ledgers.len(), 1);
    assert_eq!(
        ledgers[0].standing(),
        DebtStanding::ToReceive(Money::from_cents(3_000))
    );

    let err = FriendService::record(
        &client,
        &bob,
        TransactionKind::Income,
        Money::from_cents(100),
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::WrongLedger { .. })
    ));
}

#[test]
fn removing_friend_removes_its_entries() {
    let (client, backend) = signed_up();
    let uid = AuthService::current_user(&client).unwrap().uid;
    let bob = FriendService::add_friend(&client, "Bob").unwrap();
    FriendService::record_from_input(&client, &bob, TransactionKind::Debt, "12.50", None).unwrap();
    FriendService::record_from_input(&client, &bob, TransactionKind::Payment, "2", None).unwrap();

    let removed = FriendService::remove_friend(&client, &bob.id).unwrap();
    assert_eq!(removed, 2);
    assert!(backend
        .list(&paths::friend_transactions(&uid, &bob.id))
        .unwrap()
        .is_empty());
    assert!(FriendService::list_friends(&client).unwrap().items.is_empty());
}

#[test]
fn friend_lookup_by_name_or_id() {
    let (client, _backend) = signed_up();
    let bob = FriendService::add_friend(&client, "Bob").unwrap();
    assert_eq!(FriendService::find_friend(&client, "bob").unwrap().id, bob.id);
    assert_eq!(FriendService::find_friend(&client, &bob.id).unwrap().name, "Bob");
    assert!(matches!(
        FriendService::find_friend(&client, ""),
        Err(CoreError::Validation(ValidationError::NoFriendSelected))
    ));
    assert!(matches!(
        FriendService::add_friend(&client, " "),
        Err(CoreError::Validation(ValidationError::MissingFriendName))
    ));
}

#[test]
fn target_balance_must_be_positive() {
    let (client, _backend) = signed_up();
    assert!(ProfileService::set_target_from_input(&client, "0").is_err());
    ProfileService::set_target_from_input(&client, "2000").unwrap();
    let (profile, _) = ProfileService::profile(&client).unwrap();
    assert_eq!(profile.target_balance, Money::from_cents(200_000));
}

#[test]
fn live_dashboard_recomputes_on_changes() {
    let (client, _backend) = signed_up();
    let mut live = LiveDashboard::start(client.clone(), 5).unwrap();
    assert!(!live.poll().unwrap());
    assert_eq!(live.current().balance, Money::ZERO);

    TransactionService::add(&client, TransactionKind::Income, Money::from_cents(5_000), None)
        .unwrap();
    assert!(live.poll().unwrap());
    assert_eq!(live.current().balance, Money::from_cents(5_000));

    ProfileService::set_target_balance(&client, Money::from_cents(10_000)).unwrap();
    assert!(live.poll().unwrap());
    assert_eq!(live.current().progress, 0.5);
    assert_eq!(live.recomputes(), 2);
}

#[test]
fn live_dashboard_follows_friend_ledgers() {
    let (client, _backend) = signed_up();
    let mut live = LiveDashboard::start(client.clone(), 5).unwrap();
    let bob = FriendService::add_friend(&client, "Bob").unwrap();
    assert!(live.poll().unwrap());
    assert_eq!(live.current().debts().to_receive, Money::ZERO);

    FriendService::record(&client, &bob, TransactionKind::Debt, Money::from_cents(2_500), None)
        .unwrap();
    assert!(live.poll().unwrap());
    assert_eq!(live.current().debts().to_receive, Money::from_cents(2_500));
}

#[test]
fn live_dashboard_keeps_previous_snapshot_on_backend_error() {
    let (client, backend) = signed_up();
    let mut live = LiveDashboard::start(client.clone(), 5).unwrap();
    TransactionService::add(&client, TransactionKind::Income, Money::from_cents(700), None)
        .unwrap();
    backend.set_online(false);
    assert!(live.poll().is_err());
    assert_eq!(live.current().balance, Money::ZERO);

    backend.set_online(true);
    assert!(live.poll().unwrap());
    assert_eq!(live.current().balance, Money::from_cents(700));
    assert!(!live.poll().unwrap());
}

#[test]
fn dropping_live_dashboard_unsubscribes() {
    let (client, backend) = signed_up();
    let live = LiveDashboard::start(client.clone(), 5).unwrap();
    drop(live);
    TransactionService::add(&client, TransactionKind::Income, Money::from_cents(1), None).unwrap();
    ProfileService::set_target_balance(&client, Money::from_cents(100)).unwrap();
    FriendService::add_friend(&client, "Zed").unwrap();
    assert_eq!(backend.listener_count(), 0);
}

#[test]
fn sign_in_rejects_malformed_email_before_the_backend() {
    let (client, backend) = signed_up();
    AuthService::sign_out(&client).unwrap();
    backend.set_online(false);
    assert!(matches!(
        AuthService::sign_in(&client, "not-an-email", "whatever"),
        Err(CoreError::Validation(ValidationError::InvalidEmail))
    ));
}

#[test]
fn password_reset_flow() {
    let (client, backend) = signed_up();
    assert!(matches!(
        AuthService::send_password_reset(&client, ""),
        Err(CoreError::Validation(ValidationError::MissingEmail))
    ));
    AuthService::send_password_reset(&client, "ada@example.com").unwrap();
    let code = backend.pending_reset_code("ada@example.com").unwrap();
    AuthService::confirm_password_reset(&client, &code, "Fresh123").unwrap();
    AuthService::sign_out(&client).unwrap();
    assert!(AuthService::sign_in(&client, "ada@example.com", "Fresh123").is_ok());
}
