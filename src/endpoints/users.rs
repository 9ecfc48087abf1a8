use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::CONFIG;
use crate::endpoints::uploads;
use crate::error::{AppError, Result};
use crate::middleware::{AuthenticatedUser, Pagination};
use crate::models::prelude::*;
use crate::models::user::UserRole;
use crate::models::{funding_pool, investment, invitation, user};
use crate::services::security::{
    create_access_token, generate_random_string, generate_referral_code, hash_password,
    verify_password,
};
use crate::state::AppState;

/// Account routes reachable without a token.
pub fn public_routes(state: AppState) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/login/admin", post(admin_login))
        .route("/recover-password", post(recover_password))
        .route("/update-forgotten-password", put(update_forgotten_password))
        .with_state(state)
}

/// Routes for any authenticated account.
pub fn protected_routes(state: AppState) -> Router {
    Router::new()
        .route("/", put(update_profile))
        .route("/me", get(me))
        .route("/change-password", put(change_password))
        .route("/logout", post(logout))
        .route("/wallets", get(list_wallets))
        .route("/update-wallet", put(add_wallet))
        .route("/referrals", get(list_referrals))
        .route("/referred-user-wallet", get(referred_user_wallet))
        .route("/investments", get(my_investments))
        .route("/validation-by-email/{email}", get(validate_email))
        .route("/invite-friends", post(invite_friends))
        .route("/search", get(search_users))
        .route("/start-kyc", post(start_kyc))
        .route("/kyc-document", get(kyc_document))
        .route("/media/{identification_id}", get(kyc_media))
        .route("/saft", post(download_saft))
        .route("/file", post(uploads::upload_file))
        .with_state(state)
}

/// Admin-only account management.
pub fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/admin", get(list_users).post(create_user))
        .route("/admin/update-user/{id}", put(update_user))
        .route("/admin/{id}", delete(delete_user))
        .route("/delete-wallet", delete(remove_wallet))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub referral_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecoverPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateForgottenPasswordRequest {
    pub new_password: Option<String>,
    pub email_verification_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub twitter_link: Option<String>,
    pub instagram_link: Option<String>,
    pub discord_link: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRequest {
    pub wallet_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteFriendRequest {
    pub to_email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadSaftRequest {
    pub file_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchQuery {
    pub email: Option<String>,
    pub kyc_passed: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub primary_wallet_address: Option<String>,
}

/// One ledger row with the deal it was made against.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentWithPool {
    #[serde(flatten)]
    pub investment: investment::Model,
    pub funding_pool: Option<funding_pool::Model>,
}

// ============================================================================
// Registration & Login
// ============================================================================

/// Create an account. A valid referral code on signup records an invitation
/// for the referring user.
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let (Some(email), Some(password)) = (req.email.clone(), req.password.clone()) else {
        return Err(AppError::BadRequest(
            "Submit all required parameters".to_string(),
        ));
    };

    let existing = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("You already have account".to_string()));
    }

    let now = Utc::now();
    let new_user = user::ActiveModel {
        name: Set(req.first_name.clone()),
        surname: Set(req.last_name.clone()),
        email: Set(email.clone()),
        hashed_password: Set(hash_password(&password)?),
        role: Set(UserRole::Basic),
        wallet_addresses: Set(Default::default()),
        kyc_passed: Set(false),
        referral_code: Set(generate_referral_code()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = new_user.insert(&state.db).await?;

    let token = create_access_token(&created)?;

    state.mailer.send_welcome(&created.email).await?;

    if let Some(code) = req.referral_code.as_deref().filter(|c| !c.is_empty()) {
        let inviting_user = User::find()
            .filter(user::Column::ReferralCode.eq(code))
            .one(&state.db)
            .await?;

        if let Some(inviter) = inviting_user {
            let record = invitation::ActiveModel {
                sender_id: Set(inviter.id),
                recipient_email: Set(created.email.clone()),
                referral_code: Set(code.to_string()),
                created_at: Set(now),
                ..Default::default()
            };
            record.insert(&state.db).await?;
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({ "token": token, "user": created })),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>> {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(AppError::BadRequest(
            "Submit all required parameters".to_string(),
        ));
    };

    let found = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Account with {} doesn't exist", email)))?;

    if !verify_password(&password, &found.hashed_password) {
        return Err(AppError::Unauthorized("Wrong password".to_string()));
    }

    let token = create_access_token(&found)?;
    Ok(Json(json!({ "userData": { "token": token, "user": found } })))
}

/// Dashboard login. The role gate runs before the password check so a
/// non-admin never learns whether their password was right.
async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>> {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(AppError::BadRequest(
            "Submit all required parameters".to_string(),
        ));
    };

    let found = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Account with {} doesn't exist", email)))?;

    if !found.is_admin() {
        return Err(AppError::Forbidden(
            "Only admin can log in to the Admin dashboard".to_string(),
        ));
    }

    if !verify_password(&password, &found.hashed_password) {
        return Err(AppError::Unauthorized("Wrong password".to_string()));
    }

    let token = create_access_token(&found)?;
    Ok(Json(json!({ "userData": { "token": token, "user": found } })))
}

/// Stateless logout; the client drops its token.
async fn logout(Extension(_auth_user): Extension<AuthenticatedUser>) -> StatusCode {
    StatusCode::NO_CONTENT
}

// ============================================================================
// Password Recovery
// ============================================================================

async fn recover_password(
    State(state): State<AppState>,
    Json(req): Json<RecoverPasswordRequest>,
) -> Result<Json<serde_json::Value>> {
    let Some(email) = req.email else {
        return Err(AppError::BadRequest("Please send email".to_string()));
    };

    let found = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("There is no user with {} email", email)))?;

    let reset_token = generate_random_string(48);

    state
        .mailer
        .send_password_reset(&email, &CONFIG.frontend_url, &reset_token)
        .await?;

    let mut active: user::ActiveModel = found.into();
    active.password_reset_token = Set(Some(reset_token.clone()));
    active.updated_at = Set(Utc::now());
    active.update(&state.db).await?;

    Ok(Json(json!({
        "emailVerificationToken": reset_token,
        "message": format!("It was successfully sent to {}", email),
    })))
}

/// Set a new password against a recovery token. The token is single-use.
async fn update_forgotten_password(
    State(state): State<AppState>,
    Json(req): Json<UpdateForgottenPasswordRequest>,
) -> Result<Json<serde_json::Value>> {
    let (Some(new_password), Some(token)) = (req.new_password, req.email_verification_token)
    else {
        return Err(AppError::BadRequest(
            "Send password and emailVerificationToken".to_string(),
        ));
    };

    let found = User::find()
        .filter(user::Column::PasswordResetToken.eq(&token))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::BadRequest("Wrong token".to_string()))?;

    let mut active: user::ActiveModel = found.into();
    active.hashed_password = Set(hash_password(&new_password)?);
    active.password_reset_token = Set(None);
    active.updated_at = Set(Utc::now());
    active.update(&state.db).await?;

    Ok(Json(json!({ "message": "Password successfully updated" })))
}

async fn change_password(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    let current = auth_user.0;

    if !verify_password(&req.old_password, &current.hashed_password) {
        return Err(AppError::Unauthorized("Wrong password".to_string()));
    }

    let email = current.email.clone();
    let mut active: user::ActiveModel = current.into();
    active.hashed_password = Set(hash_password(&req.new_password)?);
    active.updated_at = Set(Utc::now());
    active.update(&state.db).await?;

    state.mailer.send_password_changed(&email).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Profile
// ============================================================================

async fn me(Extension(auth_user): Extension<AuthenticatedUser>) -> Json<serde_json::Value> {
    Json(json!({ "data": auth_user.0 }))
}

/// Update the caller's profile. Name and avatar keep their old value when
/// omitted; the social fields are replaced wholesale.
async fn update_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>> {
    let current = auth_user.0;

    let name = req.first_name.clone().or_else(|| current.name.clone());
    let surname = req.last_name.clone().or_else(|| current.surname.clone());
    let image_url = req.image_url.clone().or_else(|| current.image_url.clone());

    let mut active: user::ActiveModel = current.into();
    active.name = Set(name);
    active.surname = Set(surname);
    active.bio = Set(req.bio);
    active.twitter_link = Set(req.twitter_link);
    active.instagram_link = Set(req.instagram_link);
    active.discord_link = Set(req.discord_link);
    active.image_url = Set(image_url);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(json!({ "user": updated })))
}

/// The caller checks that an email they typed is their own.
async fn validate_email(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(email): Path<String>,
) -> Json<serde_json::Value> {
    let matches = auth_user.0.email == email;
    Json(json!({
        "success": matches,
        "message": if matches { "Success" } else { "Wrong Email" },
    }))
}

// ============================================================================
// Wallets
// ============================================================================

async fn list_wallets(Extension(auth_user): Extension<AuthenticatedUser>) -> Json<serde_json::Value> {
    Json(json!({ "walletAddresses": auth_user.0.wallet_addresses.0 }))
}

/// Link a wallet to the account; the first linked wallet becomes primary.
/// Re-adding a known address is a no-op.
async fn add_wallet(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(req): Json<WalletRequest>,
) -> Result<Json<user::Model>> {
    let current = auth_user.0;

    if current.wallet_addresses.0.contains(&req.wallet_address) {
        return Ok(Json(current));
    }

    let mut wallets = current.wallet_addresses.clone();
    wallets.0.push(req.wallet_address.clone());
    let primary = current
        .primary_wallet_address
        .clone()
        .or(Some(req.wallet_address));

    let mut active: user::ActiveModel = current.into();
    active.wallet_addresses = Set(wallets);
    active.primary_wallet_address = Set(primary);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(updated))
}

/// Unlink a wallet from the calling admin's account. When the primary
/// wallet is removed, the most recently linked one takes its place.
async fn remove_wallet(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(req): Json<WalletRequest>,
) -> Result<Json<serde_json::Value>> {
    let current = auth_user.0;

    if !current.wallet_addresses.0.contains(&req.wallet_address) {
        return Err(AppError::NotFound("Wallet does not exist!".to_string()));
    }

    let mut wallets = current.wallet_addresses.clone();
    wallets.0.retain(|w| *w != req.wallet_address);

    let primary = match &current.primary_wallet_address {
        Some(p) if *p == req.wallet_address => wallets.0.last().cloned(),
        other => other.clone(),
    };

    let mut active: user::ActiveModel = current.into();
    active.wallet_addresses = Set(wallets);
    active.primary_wallet_address = Set(primary);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(json!({ "user": updated })))
}

// ============================================================================
// Referrals
// ============================================================================

/// Email a referral link carrying the caller's code. The invitation record
/// itself is only created once the recipient signs up with the code.
async fn invite_friends(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(req): Json<InviteFriendRequest>,
) -> Result<Json<serde_json::Value>> {
    let current = auth_user.0;

    let Some(to_email) = req.to_email.filter(|e| !e.is_empty()) else {
        return Err(AppError::BadRequest("Send email".to_string()));
    };

    if current.email == to_email {
        return Err(AppError::BadRequest(
            "You can't send invitation to your email".to_string(),
        ));
    }

    let already_registered = User::find()
        .filter(user::Column::Email.eq(&to_email))
        .one(&state.db)
        .await?;
    if already_registered.is_some() {
        return Err(AppError::Conflict(format!(
            "{} is already registered",
            to_email
        )));
    }

    state
        .mailer
        .send_referral_invite(&to_email, &CONFIG.frontend_url, &current.referral_code)
        .await?;

    Ok(Json(json!({
        "message": format!("It was successfully sent to {}", to_email),
    })))
}

async fn list_referrals(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    pagination: Pagination,
) -> Result<Json<serde_json::Value>> {
    let count = Invitation::find()
        .filter(invitation::Column::SenderId.eq(auth_user.0.id))
        .count(&state.db)
        .await?;

    let invitations = Invitation::find()
        .filter(invitation::Column::SenderId.eq(auth_user.0.id))
        .offset(pagination.start_index)
        .limit(pagination.sql_limit())
        .all(&state.db)
        .await?;

    Ok(Json(json!({ "data": invitations, "countForUser": count })))
}

/// Wallet of the user who referred the caller, if any. Used to route the
/// referrer fee when the caller invests.
async fn referred_user_wallet(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Response> {
    let invitation = Invitation::find()
        .filter(invitation::Column::RecipientEmail.eq(&auth_user.0.email))
        .one(&state.db)
        .await?;

    let Some(invitation) = invitation else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let sender = User::find_by_id(invitation.sender_id).one(&state.db).await?;
    match sender.and_then(|s| s.wallet_addresses.0.last().cloned()) {
        Some(wallet) => Ok(Json(json!({ "data": wallet })).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

// ============================================================================
// Caller's Investments
// ============================================================================

/// The caller's ledger, newest first, with the lifetime total across all
/// pages.
async fn my_investments(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    pagination: Pagination,
) -> Result<Json<serde_json::Value>> {
    let filter = investment::Column::UserId.eq(auth_user.0.id);

    let count = Investment::find()
        .filter(filter.clone())
        .count(&state.db)
        .await?;

    let total_investment: f64 = Investment::find()
        .filter(filter.clone())
        .all(&state.db)
        .await?
        .iter()
        .map(|inv| inv.amount_invested)
        .sum();

    let rows = Investment::find()
        .filter(filter)
        .order_by_desc(investment::Column::InvestmentDate)
        .find_also_related(FundingPool)
        .offset(pagination.start_index)
        .limit(pagination.sql_limit())
        .all(&state.db)
        .await?;

    let data: Vec<InvestmentWithPool> = rows
        .into_iter()
        .map(|(investment, funding_pool)| InvestmentWithPool {
            investment,
            funding_pool,
        })
        .collect();

    Ok(Json(json!({
        "data": data,
        "count": count,
        "totalInvestment": total_investment,
    })))
}

// ============================================================================
// KYC
// ============================================================================

/// Open an identity-verification session and remember its id; the provider
/// reports the outcome through the webhook.
async fn start_kyc(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<serde_json::Value>> {
    let current = auth_user.0;

    let session = state.kyc.start_verification(&current).await?;
    if session.identification_id.is_empty() {
        return Err(AppError::Internal(
            "identificationId was not generated".to_string(),
        ));
    }

    let mut active: user::ActiveModel = current.into();
    active.identification_id = Set(Some(session.identification_id.clone()));
    active.updated_at = Set(Utc::now());
    active.update(&state.db).await?;

    Ok(Json(json!({ "data": session })))
}

/// Pull the verified document data for the caller and sync name, surname,
/// country and nationality from it.
async fn kyc_document(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<serde_json::Value>> {
    let current = auth_user.0;

    if !current.kyc_passed {
        return Err(AppError::BadRequest(format!(
            "{} user not passed KYC",
            current.email
        )));
    }

    let identification_id = current.identification_id.clone().ok_or_else(|| {
        AppError::BadRequest("KYC verification has not been started".to_string())
    })?;

    let document = state
        .kyc
        .fetch_verified_data(&identification_id, "data")
        .await?;
    let details = document
        .get("documentData")
        .cloned()
        .unwrap_or(serde_json::Value::Null);

    let mut active: user::ActiveModel = current.into();
    if let Some(v) = details.get("firstName").and_then(|v| v.as_str()) {
        active.name = Set(Some(v.to_string()));
    }
    if let Some(v) = details.get("lastName").and_then(|v| v.as_str()) {
        active.surname = Set(Some(v.to_string()));
    }
    if let Some(v) = details.get("country").and_then(|v| v.as_str()) {
        active.country = Set(Some(v.to_string()));
    }
    if let Some(v) = details.get("nationality").and_then(|v| v.as_str()) {
        active.nationality = Set(Some(v.to_string()));
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(json!({ "data": updated })))
}

/// Verification media for review; the session is addressed by provider id,
/// not by user id.
async fn kyc_media(
    State(state): State<AppState>,
    Path(identification_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let owner = User::find()
        .filter(user::Column::IdentificationId.eq(&identification_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest("Identification id is not valid".to_string())
        })?;

    if !owner.kyc_passed {
        return Err(AppError::BadRequest(format!(
            "{} user not passed KYC",
            owner.email
        )));
    }

    let media = state
        .kyc
        .fetch_verified_data(&identification_id, "media")
        .await?;

    Ok(Json(json!({ "data": media })))
}

// ============================================================================
// Documents
// ============================================================================

/// Fetch a signed SAFT PDF (base64) from the e-signature provider.
async fn download_saft(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Json(req): Json<DownloadSaftRequest>,
) -> Result<Json<serde_json::Value>> {
    let content = state.esign.download_document(&req.file_id).await?;

    if content.is_empty() {
        return Err(AppError::NotFound(
            "No Saft pdf found for this investment".to_string(),
        ));
    }

    Ok(Json(json!({
        "data": content,
        "message": "Saft pdf downloaded successfully",
    })))
}

// ============================================================================
// Search
// ============================================================================

/// Case-insensitive substring search on email, with an optional KYC-state
/// filter.
async fn search_users(
    State(state): State<AppState>,
    Query(q): Query<UserSearchQuery>,
    pagination: Pagination,
) -> Result<Json<serde_json::Value>> {
    let mut query = User::find();

    if let Some(email) = q.email.as_deref().filter(|e| !e.is_empty()) {
        query = query.filter(
            Expr::expr(Func::lower(Expr::col((user::Entity, user::Column::Email))))
                .like(format!("%{}%", email.to_lowercase())),
        );
    }
    if let Some(kyc_passed) = q.kyc_passed {
        query = query.filter(user::Column::KycPassed.eq(kyc_passed));
    }

    let count = query.clone().count(&state.db).await?;
    let data = query
        .offset(pagination.start_index)
        .limit(pagination.sql_limit())
        .all(&state.db)
        .await?;

    Ok(Json(json!({ "data": data, "count": count })))
}

// ============================================================================
// Admin Account Management
// ============================================================================

async fn list_users(
    State(state): State<AppState>,
    pagination: Pagination,
) -> Result<Json<serde_json::Value>> {
    let count = User::find().count(&state.db).await?;
    let data = User::find()
        .offset(pagination.start_index)
        .limit(pagination.sql_limit())
        .all(&state.db)
        .await?;

    Ok(Json(json!({ "data": data, "count": count })))
}

async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let existing = User::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!("{} already exist", req.email)));
    }

    let now = Utc::now();
    let new_user = user::ActiveModel {
        name: Set(req.name),
        surname: Set(req.surname),
        email: Set(req.email.clone()),
        hashed_password: Set(hash_password(&req.password)?),
        role: Set(req.role.unwrap_or(UserRole::Basic)),
        wallet_addresses: Set(Default::default()),
        kyc_passed: Set(false),
        referral_code: Set(generate_referral_code()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = new_user.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("{} successfully created", req.email),
            "data": created,
        })),
    ))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AdminUpdateUserRequest>,
) -> Result<Json<serde_json::Value>> {
    let found = User::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User does not exist!".to_string()))?;

    let mut active: user::ActiveModel = found.into();
    if req.name.is_some() {
        active.name = Set(req.name);
    }
    if req.surname.is_some() {
        active.surname = Set(req.surname);
    }
    if let Some(email) = req.email {
        active.email = Set(email);
    }
    if let Some(role) = req.role {
        active.role = Set(role);
    }
    if req.primary_wallet_address.is_some() {
        active.primary_wallet_address = Set(req.primary_wallet_address);
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(json!({ "data": updated })))
}

async fn delete_user(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    let deleted = User::delete_by_id(id).exec(&state.db).await?;
    if deleted.rows_affected == 0 {
        return Err(AppError::NotFound("User does not exist!".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
