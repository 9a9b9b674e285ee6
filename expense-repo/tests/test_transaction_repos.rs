mod utils;

use chrono::NaiveDate;
use expense_repo::transaction_repo::{
    Filter, NewTransaction, Totals, Transaction, TransactionRepoError, TransactionType,
    UNCATEGORIZED,
};
use rstest::rstest;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use utils::generator::{any_amount, any_date, NewTransactionGenerator};
use utils::test_user::TestUser;
use utils::RepoType;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_create_and_get_transaction(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.users).await;

    let new_transaction = NewTransactionGenerator::default().generate();
    let created = repos
        .transactions
        .create_new_transaction(user.id, new_transaction.clone())
        .await
        .unwrap();
    assert_eq!(created, new_transaction.to_transaction(created.id));

    let fetched = repos
        .transactions
        .get_transaction(user.id, created.id)
        .await
        .unwrap();
    assert_eq!(created, fetched);

    user.delete().await;
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_get_invalid_transaction(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.users).await;

    let result = repos.transactions.get_transaction(user.id, -1).await;
    assert!(matches!(
        result,
        Err(TransactionRepoError::TransactionNotFound(-1))
    ));

    user.delete().await;
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_transactions_are_private(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let owner = TestUser::new(&repos.users).await;
    let other = TestUser::new(&repos.users).await;

    let transaction = repos
        .transactions
        .create_new_transaction(owner.id, NewTransactionGenerator::default().generate())
        .await
        .unwrap();

    let get_result = repos
        .transactions
        .get_transaction(other.id, transaction.id)
        .await;
    assert!(matches!(
        get_result,
        Err(TransactionRepoError::TransactionNotFound(_))
    ));

    let update_result = repos
        .transactions
        .update_transaction(
            other.id,
            transaction.id,
            NewTransactionGenerator::default().generate(),
        )
        .await;
    assert!(matches!(
        update_result,
        Err(TransactionRepoError::TransactionNotFound(_))
    ));

    let delete_result = repos
        .transactions
        .delete_transaction(other.id, transaction.id)
        .await;
    assert!(matches!(
        delete_result,
        Err(TransactionRepoError::TransactionNotFound(_))
    ));

    let others_transactions = repos
        .transactions
        .get_all_transactions(other.id, Filter::NONE)
        .await
        .unwrap();
    assert!(others_transactions.is_empty());

    // still there for the owner
    let fetched = repos
        .transactions
        .get_transaction(owner.id, transaction.id)
        .await
        .unwrap();
    assert_eq!(transaction, fetched);

    owner.delete().await;
    other.delete().await;
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_delete_transaction(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.users).await;

    let transaction = repos
        .transactions
        .create_new_transaction(user.id, NewTransactionGenerator::default().generate())
        .await
        .unwrap();

    let deleted = repos
        .transactions
        .delete_transaction(user.id, transaction.id)
        .await
        .unwrap();
    assert_eq!(transaction, deleted);

    let get_result = repos
        .transactions
        .get_transaction(user.id, transaction.id)
        .await;
    assert!(matches!(
        get_result,
        Err(TransactionRepoError::TransactionNotFound(_))
    ));

    // deleting twice reports the transaction as missing
    let second_delete = repos
        .transactions
        .delete_transaction(user.id, transaction.id)
        .await;
    assert!(matches!(
        second_delete,
        Err(TransactionRepoError::TransactionNotFound(_))
    ));

    user.delete().await;
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_update_transaction(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.users).await;

    let transaction = repos
        .transactions
        .create_new_transaction(user.id, NewTransactionGenerator::default().generate())
        .await
        .unwrap();

    let update = NewTransaction::new(
        TransactionType::Expense,
        Some("utilities".to_owned()),
        Decimal::new(4250, 2),
        date(2024, 2, 29),
        None,
    );
    let updated = repos
        .transactions
        .update_transaction(user.id, transaction.id, update.clone())
        .await
        .unwrap();
    assert_eq!(updated, update.to_transaction(transaction.id));

    let fetched = repos
        .transactions
        .get_transaction(user.id, transaction.id)
        .await
        .unwrap();
    assert_eq!(updated, fetched);

    user.delete().await;
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_update_invalid_transaction(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.users).await;

    let result = repos
        .transactions
        .update_transaction(user.id, -1, NewTransactionGenerator::default().generate())
        .await;
    assert!(matches!(
        result,
        Err(TransactionRepoError::TransactionNotFound(-1))
    ));

    user.delete().await;
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_negative_amount_rejected(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.users).await;

    let new_transaction = NewTransaction::new(
        TransactionType::Expense,
        None,
        Decimal::new(-100, 2),
        any_date(),
        None,
    );
    let result = repos
        .transactions
        .create_new_transaction(user.id, new_transaction)
        .await;
    assert!(matches!(
        result,
        Err(TransactionRepoError::InvalidTransaction(_))
    ));

    let transactions = repos
        .transactions
        .get_all_transactions(user.id, Filter::NONE)
        .await
        .unwrap();
    assert!(transactions.is_empty());

    user.delete().await;
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_missing_category_is_uncategorized(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.users).await;

    let new_transaction = NewTransaction::new(
        TransactionType::Income,
        None,
        Decimal::ZERO,
        any_date(),
        None,
    );
    let transaction = repos
        .transactions
        .create_new_transaction(user.id, new_transaction)
        .await
        .unwrap();
    assert_eq!(transaction.category, UNCATEGORIZED);
    assert_eq!(transaction.amount, Decimal::ZERO);

    user.delete().await;
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_get_all_transactions(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.users).await;

    let mut created = BTreeSet::new();
    for new_transaction in NewTransactionGenerator::default().generate_many(10) {
        let transaction = repos
            .transactions
            .create_new_transaction(user.id, new_transaction)
            .await
            .unwrap();
        created.insert(transaction);
    }

    let all = repos
        .transactions
        .get_all_transactions(user.id, Filter::NONE)
        .await
        .unwrap();
    assert_eq!(all.len(), 10);
    assert_eq!(all.into_iter().collect::<BTreeSet<Transaction>>(), created);

    user.delete().await;
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_transactions_sorted_newest_first(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.users).await;

    let mut generator = NewTransactionGenerator::default().with_dates(vec![
        date(2023, 5, 1),
        date(2024, 1, 15),
        date(2023, 12, 31),
        date(2024, 1, 15),
    ]);
    for new_transaction in generator.generate_many(4) {
        repos
            .transactions
            .create_new_transaction(user.id, new_transaction)
            .await
            .unwrap();
    }

    let all = repos
        .transactions
        .get_all_transactions(user.id, Filter::NONE)
        .await
        .unwrap();
    let dates: Vec<NaiveDate> = all.iter().map(|t| t.date).collect();
    assert_eq!(
        dates,
        vec![
            date(2024, 1, 15),
            date(2024, 1, 15),
            date(2023, 12, 31),
            date(2023, 5, 1)
        ]
    );
    // same date, later insert first
    assert!(all[0].id > all[1].id);

    user.delete().await;
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_filter_transactions(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.users).await;

    let mut generator = NewTransactionGenerator::default()
        .with_types(vec![
            TransactionType::Income,
            TransactionType::Expense,
            TransactionType::Expense,
            TransactionType::Income,
        ])
        .with_categories(vec!["salary", "food", "rent", "salary"])
        .with_dates(vec![
            date(2024, 1, 1),
            date(2024, 1, 10),
            date(2024, 1, 31),
            date(2024, 2, 1),
        ]);
    for new_transaction in generator.generate_many(4) {
        repos
            .transactions
            .create_new_transaction(user.id, new_transaction)
            .await
            .unwrap();
    }

    let by_category = repos
        .transactions
        .get_all_transactions(
            user.id,
            Filter {
                category: Some("salary".to_owned()),
                ..Filter::NONE
            },
        )
        .await
        .unwrap();
    assert_eq!(by_category.len(), 2);
    assert!(by_category.iter().all(|t| t.category == "salary"));

    let by_type = repos
        .transactions
        .get_all_transactions(
            user.id,
            Filter {
                transaction_type: Some(TransactionType::Expense),
                ..Filter::NONE
            },
        )
        .await
        .unwrap();
    assert_eq!(by_type.len(), 2);
    assert!(by_type
        .iter()
        .all(|t| t.transaction_type == TransactionType::Expense));

    // both bounds are inclusive
    let january = repos
        .transactions
        .get_all_transactions(
            user.id,
            Filter {
                start_date: Some(date(2024, 1, 1)),
                end_date: Some(date(2024, 1, 31)),
                ..Filter::NONE
            },
        )
        .await
        .unwrap();
    assert_eq!(january.len(), 3);

    let combined = repos
        .transactions
        .get_all_transactions(
            user.id,
            Filter {
                start_date: Some(date(2024, 1, 5)),
                end_date: None,
                transaction_type: Some(TransactionType::Income),
                category: Some("salary".to_owned()),
            },
        )
        .await
        .unwrap();
    assert_eq!(combined.len(), 1);
    assert_eq!(combined[0].date, date(2024, 2, 1));

    let nothing = repos
        .transactions
        .get_all_transactions(
            user.id,
            Filter {
                category: Some("travel".to_owned()),
                ..Filter::NONE
            },
        )
        .await
        .unwrap();
    assert!(nothing.is_empty());

    user.delete().await;
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_get_totals(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.users).await;

    let empty_totals = repos
        .transactions
        .get_totals(user.id, Filter::NONE)
        .await
        .unwrap();
    assert_eq!(empty_totals, Totals::ZERO);

    let mut generator = NewTransactionGenerator::default()
        .with_types(vec![
            TransactionType::Income,
            TransactionType::Expense,
            TransactionType::Expense,
        ])
        .with_categories(vec!["salary", "food", "rent"])
        .with_amounts(vec![
            Decimal::new(500, 0),
            Decimal::new(12050, 2),
            Decimal::new(7950, 2),
        ]);
    for new_transaction in generator.generate_many(3) {
        repos
            .transactions
            .create_new_transaction(user.id, new_transaction)
            .await
            .unwrap();
    }

    let totals = repos
        .transactions
        .get_totals(user.id, Filter::NONE)
        .await
        .unwrap();
    assert_eq!(totals.income, Decimal::new(500, 0));
    assert_eq!(totals.expense, Decimal::new(200, 0));
    assert_eq!(totals.balance, Decimal::new(300, 0));

    let food_totals = repos
        .transactions
        .get_totals(
            user.id,
            Filter {
                category: Some("food".to_owned()),
                ..Filter::NONE
            },
        )
        .await
        .unwrap();
    assert_eq!(
        food_totals,
        Totals::new(Decimal::ZERO, Decimal::new(12050, 2))
    );

    user.delete().await;
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_totals_match_listed_transactions(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let user = TestUser::new(&repos.users).await;

    for new_transaction in NewTransactionGenerator::default().generate_many(20) {
        repos
            .transactions
            .create_new_transaction(user.id, new_transaction)
            .await
            .unwrap();
    }
    repos
        .transactions
        .create_new_transaction(
            user.id,
            NewTransaction::new(
                TransactionType::Expense,
                Some("food".to_owned()),
                any_amount(),
                any_date(),
                None,
            ),
        )
        .await
        .unwrap();

    let filter = Filter {
        category: Some("food".to_owned()),
        ..Filter::NONE
    };
    let listed = repos
        .transactions
        .get_all_transactions(user.id, filter.clone())
        .await
        .unwrap();
    let totals = repos.transactions.get_totals(user.id, filter).await.unwrap();
    assert_eq!(totals, Totals::from_transactions(&listed));

    user.delete().await;
}
