use super::*;

/// Tests an active user passes an empty permission list.
///
/// Expected: Ok(User) matching the token subject
#[tokio::test]
async fn empty_permission_list_grants_access() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let tokens = tokens();

    let user = factory::user::create_user(db).await?;
    let bearer = bearer_for(&tokens, &user);

    let result = AuthGuard::new(db, &tokens, &bearer).require(&[]).await;

    assert!(result.is_ok());
    assert_eq!(result.unwrap().id, user.id);

    Ok(())
}

/// Tests admin permission is granted to admins only.
///
/// Expected: Ok for the admin, Err(AuthError::AccessDenied) for a passenger
#[tokio::test]
async fn admin_permission_requires_admin_role() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let tokens = tokens();

    let admin = factory::user::create_admin(db).await?;
    let passenger = factory::user::create_user(db).await?;

    let admin_bearer = bearer_for(&tokens, &admin);
    let result = AuthGuard::new(db, &tokens, &admin_bearer)
        .require(&[Permission::Admin])
        .await;
    assert!(result.is_ok());

    let passenger_bearer = bearer_for(&tokens, &passenger);
    let result = AuthGuard::new(db, &tokens, &passenger_bearer)
        .require(&[Permission::Admin])
        .await;
    match result {
        Err(AppError::AuthErr(AuthError::AccessDenied(user_id, message))) => {
            assert_eq!(user_id, passenger.id);
            assert!(message.contains("admin"));
        }
        other => panic!("Expected AccessDenied error, got: {:?}", other),
    }

    Ok(())
}

/// Tests a driver awaiting approval has driver access but not approved driver access.
///
/// Expected: Ok for `Driver`, Err(AccessDenied) for `ApprovedDriver`
#[tokio::test]
async fn pending_driver_is_not_approved() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let tokens = tokens();

    let driver = factory::user::UserFactory::new(db)
        .role(UserRole::Driver)
        .status(UserStatus::PendingProfileCompletion)
        .build()
        .await?;
    let bearer = bearer_for(&tokens, &driver);
    let guard = AuthGuard::new(db, &tokens, &bearer);

    assert!(guard.require(&[Permission::Driver]).await.is_ok());
    assert!(matches!(
        guard.require(&[Permission::ApprovedDriver]).await,
        Err(AppError::AuthErr(AuthError::AccessDenied(_, _)))
    ));

    Ok(())
}

/// Tests blocked users are rejected before permissions are evaluated.
///
/// Expected: Err(AuthError::UserBlocked)
#[tokio::test]
async fn rejects_blocked_user() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let tokens = tokens();

    let user = factory::user::UserFactory::new(db)
        .status(UserStatus::Blocked)
        .build()
        .await?;
    let bearer = bearer_for(&tokens, &user);

    let result = AuthGuard::new(db, &tokens, &bearer).require(&[]).await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::UserBlocked(id))) if id == user.id
    ));

    Ok(())
}

/// Tests a token whose user was deleted is rejected.
///
/// Expected: Err(AuthError::UserNotInDatabase)
#[tokio::test]
async fn rejects_unknown_user() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let tokens = tokens();

    let bearer = BearerToken(tokens.issue(999, UserRole::Passenger, TokenKind::Access)?);

    let result = AuthGuard::new(db, &tokens, &bearer).require(&[]).await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::UserNotInDatabase(999)))
    ));

    Ok(())
}

/// Tests refresh tokens cannot be used to call the API.
///
/// Expected: Err(AuthError::InvalidToken)
#[tokio::test]
async fn rejects_refresh_token() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let tokens = tokens();

    let user = factory::user::create_user(db).await?;
    let bearer = BearerToken(tokens.issue(user.id, user.role, TokenKind::Refresh)?);

    let result = AuthGuard::new(db, &tokens, &bearer).require(&[]).await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::InvalidToken))
    ));

    Ok(())
}
