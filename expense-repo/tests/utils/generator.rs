use chrono::NaiveDate;
use expense_repo::transaction_repo::{NewTransaction, TransactionType};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;

pub trait Generator<T> {
    fn gen(&mut self) -> T;
}

pub struct Predefined<T> {
    values: Vec<T>,
    current_pos: usize,
}

impl<T> Predefined<T> {
    pub fn boxed(values: Vec<T>) -> Box<Predefined<T>> {
        Box::new(Predefined {
            values,
            current_pos: 0,
        })
    }
}

impl<T: Clone> Generator<T> for Predefined<T> {
    fn gen(&mut self) -> T {
        let v = self.values[self.current_pos].clone();
        self.current_pos += 1;
        v
    }
}

pub struct RandomSample<T> {
    values: Vec<T>,
}

impl<T> RandomSample<T> {
    pub fn boxed(values: Vec<T>) -> Box<RandomSample<T>> {
        Box::new(RandomSample { values })
    }
}

impl<T: Clone> Generator<T> for RandomSample<T> {
    fn gen(&mut self) -> T {
        self.values.choose(&mut rand::thread_rng()).unwrap().clone()
    }
}

pub struct FakeGenerator<F: Fake> {
    fake: F,
}

impl<F: Fake> FakeGenerator<F> {
    pub fn boxed(fake: F) -> Box<FakeGenerator<F>> {
        Box::new(FakeGenerator { fake })
    }
}

impl<T: fake::Dummy<F>, F> Generator<T> for FakeGenerator<F> {
    fn gen(&mut self) -> T {
        self.fake.fake()
    }
}

/// Non-negative amounts with two decimal places.
pub struct FakeAmount;

impl Generator<Decimal> for FakeAmount {
    fn gen(&mut self) -> Decimal {
        Decimal::new((0..10_000_000i64).fake::<i64>(), 2)
    }
}

/// Dates in a range every backing store can represent.
pub struct FakeDate;

impl Generator<NaiveDate> for FakeDate {
    fn gen(&mut self) -> NaiveDate {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        start + chrono::Duration::days((0..10_000i64).fake::<i64>())
    }
}

#[allow(dead_code)]
pub struct NewTransactionGenerator {
    type_gen: Box<dyn Generator<TransactionType>>,
    cat_gen: Box<dyn Generator<Option<String>>>,
    amnt_gen: Box<dyn Generator<Decimal>>,
    date_gen: Box<dyn Generator<NaiveDate>>,
    desc_gen: Box<dyn Generator<Option<String>>>,
}

#[allow(dead_code)]
impl NewTransactionGenerator {
    pub fn with_types(mut self, types: Vec<TransactionType>) -> NewTransactionGenerator {
        self.type_gen = Predefined::boxed(types);
        self
    }

    pub fn with_categories(mut self, categories: Vec<&str>) -> NewTransactionGenerator {
        let categories = categories
            .into_iter()
            .map(|s| Some(s.to_string()))
            .collect();
        self.cat_gen = Predefined::boxed(categories);
        self
    }

    pub fn with_dates(mut self, dates: Vec<NaiveDate>) -> NewTransactionGenerator {
        self.date_gen = Predefined::boxed(dates);
        self
    }

    pub fn with_amounts(mut self, amounts: Vec<Decimal>) -> NewTransactionGenerator {
        self.amnt_gen = Predefined::boxed(amounts);
        self
    }

    pub fn generate(&mut self) -> NewTransaction {
        NewTransaction::new(
            self.type_gen.gen(),
            self.cat_gen.gen(),
            self.amnt_gen.gen(),
            self.date_gen.gen(),
            self.desc_gen.gen(),
        )
    }

    pub fn generate_many(&mut self, count: usize) -> Vec<NewTransaction> {
        (0..count).map(|_| self.generate()).collect()
    }
}

impl Default for NewTransactionGenerator {
    fn default() -> Self {
        NewTransactionGenerator {
            type_gen: RandomSample::boxed(vec![TransactionType::Income, TransactionType::Expense]),
            cat_gen: RandomSample::boxed(vec![
                Some("food".to_string()),
                Some("rent".to_string()),
                Some("salary".to_string()),
                Some("transportation".to_string()),
            ]),
            amnt_gen: Box::new(FakeAmount),
            date_gen: Box::new(FakeDate),
            desc_gen: FakeGenerator::boxed(Sentence(2..6)),
        }
    }
}

#[allow(dead_code)]
pub fn any_amount() -> Decimal {
    FakeAmount.gen()
}

#[allow(dead_code)]
pub fn any_transaction_type() -> TransactionType {
    *[TransactionType::Income, TransactionType::Expense]
        .choose(&mut rand::thread_rng())
        .unwrap()
}

#[allow(dead_code)]
pub fn any_date() -> NaiveDate {
    FakeDate.gen()
}
