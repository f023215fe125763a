//! Invoke any [`WalletClient`] operation by name from a list of command-line tokens.
//!
//! Each argument token is parsed as JSON when it can be (numbers, booleans, `null`,
//! arrays, objects) and otherwise kept as a plain string. This is purely syntactic: a
//! token such as `123` meant as an account name becomes the number 123 and is then
//! rejected by a string parameter. Quote it as a JSON string (`'"123"'`) to pass it
//! literally.

use std::collections::HashMap;

use futures_util::future::BoxFuture;
use secrecy::SecretString;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    client::WalletClient,
    data::{AccountId, AccountIds, NewAccount, Recipient},
    error::Error,
    transport::Transport,
};

/// A by-name entry point into the client. Arguments are positional.
pub type Handler<T> = for<'a> fn(&'a WalletClient<T>, Args) -> BoxFuture<'a, Result<Value, Error>>;

/// Older operation names, still accepted.
const ALIASES: &[(&str, &str)] = &[
    ("init", "initialize"),
    ("createNewAccount", "createAccount"),
    ("getAccounts", "listAccounts"),
    ("getAccountById", "getAccount"),
    ("getAccountSeed", "getAccountSecret"),
    ("getTotalBalance", "getBalance"),
    ("getTransactions", "listTransactions"),
    ("getTransactionInfo", "getTransaction"),
    ("getLastTxId", "getLastTransactionId"),
    ("getWalletHeight", "getSyncedHeight"),
    ("sendTransaction", "submitTransaction"),
];

fn operations<T: Transport>() -> Vec<(&'static str, Handler<T>)> {
    vec![
        ("initialize", initialize::<T> as Handler<T>),
        ("createAccount", create_account::<T> as Handler<T>),
        ("listAccounts", list_accounts::<T> as Handler<T>),
        ("getAccount", get_account::<T> as Handler<T>),
        ("getAccountSecret", get_account_secret::<T> as Handler<T>),
        ("getAddress", get_address::<T> as Handler<T>),
        ("getBalance", get_balance::<T> as Handler<T>),
        ("listTransactions", list_transactions::<T> as Handler<T>),
        ("getTransaction", get_transaction::<T> as Handler<T>),
        ("getLastTransactionId", get_last_transaction_id::<T> as Handler<T>),
        ("getServerHeight", get_server_height::<T> as Handler<T>),
        ("getSyncedHeight", get_synced_height::<T> as Handler<T>),
        ("submitTransaction", submit_transaction::<T> as Handler<T>),
        ("synchronize", synchronize::<T> as Handler<T>),
    ]
}

/// Parses a token as JSON, falling back to the token itself as a string.
pub fn coerce(token: &str) -> Value {
    serde_json::from_str(token).unwrap_or_else(|_| Value::String(token.to_owned()))
}

/// Coerced positional arguments. Positions past the end read as `null`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args(Vec<Value>);

impl Args {
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        Args(tokens.iter().map(|t| coerce(t.as_ref())).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn take(&mut self, index: usize) -> Value {
        self.0.get_mut(index).map(Value::take).unwrap_or(Value::Null)
    }

    fn required<D: DeserializeOwned>(
        &mut self,
        index: usize,
        name: &'static str,
    ) -> Result<D, Error> {
        match self.take(index) {
            Value::Null => Err(Error::InvalidArgument {
                position: index + 1,
                name,
                reason: "missing".to_owned(),
            }),
            value => decode(index, name, value),
        }
    }

    fn optional<D: DeserializeOwned>(
        &mut self,
        index: usize,
        name: &'static str,
    ) -> Result<Option<D>, Error> {
        match self.take(index) {
            Value::Null => Ok(None),
            value => decode(index, name, value).map(Some),
        }
    }
}

fn decode<D: DeserializeOwned>(index: usize, name: &'static str, value: Value) -> Result<D, Error> {
    let quoted_hint = !value.is_string();
    serde_json::from_value(value).map_err(|e| Error::InvalidArgument {
        position: index + 1,
        name,
        reason: if quoted_hint {
            format!("{e} (tokens are read as JSON; wrap literal text in double quotes)")
        } else {
            e.to_string()
        },
    })
}

fn to_json<S: Serialize>(value: S) -> Result<Value, Error> {
    serde_json::to_value(value).map_err(Error::Output)
}

fn initialize<T: Transport>(
    client: &WalletClient<T>,
    _args: Args,
) -> BoxFuture<'_, Result<Value, Error>> {
    Box::pin(async move { to_json(client.initialize().await?) })
}

fn create_account<T: Transport>(
    client: &WalletClient<T>,
    mut args: Args,
) -> BoxFuture<'_, Result<Value, Error>> {
    Box::pin(async move {
        let account = NewAccount {
            key: args.optional::<String>(0, "key")?.unwrap_or_default(),
            account_index: args.optional(1, "accountIndex")?,
            birth: args.optional(2, "birth")?,
            name: args.optional(3, "accountName")?,
            passphrase: args
                .optional::<String>(4, "passphrase")?
                .map(SecretString::new),
        };
        client.create_account(&account).await
    })
}

fn list_accounts<T: Transport>(
    client: &WalletClient<T>,
    _args: Args,
) -> BoxFuture<'_, Result<Value, Error>> {
    Box::pin(async move { to_json(client.list_accounts().await?) })
}

fn get_account<T: Transport>(
    client: &WalletClient<T>,
    mut args: Args,
) -> BoxFuture<'_, Result<Value, Error>> {
    Box::pin(async move {
        let id: AccountId = args.required(0, "accountId")?;
        to_json(client.get_account(id).await?)
    })
}

fn get_account_secret<T: Transport>(
    client: &WalletClient<T>,
    mut args: Args,
) -> BoxFuture<'_, Result<Value, Error>> {
    Box::pin(async move {
        let id: AccountId = args.required(0, "accountId")?;
        to_json(client.get_account_secret(id).await?)
    })
}

fn get_address<T: Transport>(
    client: &WalletClient<T>,
    mut args: Args,
) -> BoxFuture<'_, Result<Value, Error>> {
    Box::pin(async move {
        let id: AccountId = args.required(0, "accountId")?;
        to_json(client.get_address(id).await?)
    })
}

fn get_balance<T: Transport>(
    client: &WalletClient<T>,
    mut args: Args,
) -> BoxFuture<'_, Result<Value, Error>> {
    Box::pin(async move {
        let id: AccountId = args.required(0, "accountId")?;
        to_json(client.get_balance(id).await?)
    })
}

fn list_transactions<T: Transport>(
    client: &WalletClient<T>,
    mut args: Args,
) -> BoxFuture<'_, Result<Value, Error>> {
    Box::pin(async move {
        let id: AccountId = args.required(0, "accountId")?;
        to_json(client.list_transactions(id).await?)
    })
}

fn get_transaction<T: Transport>(
    client: &WalletClient<T>,
    mut args: Args,
) -> BoxFuture<'_, Result<Value, Error>> {
    Box::pin(async move {
        let id: AccountId = args.required(0, "accountId")?;
        let txid: String = args.required(1, "txid")?;
        to_json(client.get_transaction(id, &txid).await?)
    })
}

fn get_last_transaction_id<T: Transport>(
    client: &WalletClient<T>,
    mut args: Args,
) -> BoxFuture<'_, Result<Value, Error>> {
    Box::pin(async move {
        let id: AccountId = args.required(0, "accountId")?;
        to_json(client.get_last_transaction_id(id).await?)
    })
}

fn get_server_height<T: Transport>(
    client: &WalletClient<T>,
    _args: Args,
) -> BoxFuture<'_, Result<Value, Error>> {
    Box::pin(async move { to_json(client.get_server_height().await?) })
}

fn get_synced_height<T: Transport>(
    client: &WalletClient<T>,
    mut args: Args,
) -> BoxFuture<'_, Result<Value, Error>> {
    Box::pin(async move {
        let id: AccountId = args.required(0, "accountId")?;
        to_json(client.get_synced_height(id).await?)
    })
}

fn submit_transaction<T: Transport>(
    client: &WalletClient<T>,
    mut args: Args,
) -> BoxFuture<'_, Result<Value, Error>> {
    Box::pin(async move {
        let id: AccountId = args.required(0, "accountId")?;
        let recipients: Vec<Recipient> = args.required(1, "sendRequest")?;
        client.submit_transaction(id, &recipients).await
    })
}

fn synchronize<T: Transport>(
    client: &WalletClient<T>,
    mut args: Args,
) -> BoxFuture<'_, Result<Value, Error>> {
    Box::pin(async move {
        let ids: AccountIds = args.required(0, "accountIds")?;
        client.synchronize(ids).await
    })
}

/// Resolves operation names to handlers and runs them against one client.
pub struct Dispatcher<T> {
    client: WalletClient<T>,
    handlers: HashMap<&'static str, Handler<T>>,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(client: WalletClient<T>) -> Self {
        let mut handlers: HashMap<&'static str, Handler<T>> =
            operations::<T>().into_iter().collect();
        for &(alias, target) in ALIASES {
            if let Some(handler) = handlers.get(target).copied() {
                handlers.insert(alias, handler);
            }
        }
        Dispatcher { client, handlers }
    }

    /// Canonical operation names, sorted.
    pub fn operation_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = operations::<T>().into_iter().map(|(name, _)| name).collect();
        names.sort_unstable();
        names
    }

    pub fn resolve(&self, name: &str) -> Result<Handler<T>, Error> {
        self.handlers
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownOperation(name.to_owned()))
    }

    /// Runs a full command line: the operation name followed by its argument tokens.
    pub async fn dispatch<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Value, Error> {
        let (name, args) = tokens.split_first().ok_or(Error::MissingOperation)?;
        self.invoke(name.as_ref(), args).await
    }

    /// Resolves `name`, checks that the backend is up, then calls the operation with the
    /// coerced `tokens`. Tokens beyond what the operation reads are ignored.
    pub async fn invoke<S: AsRef<str>>(&self, name: &str, tokens: &[S]) -> Result<Value, Error> {
        let handler = self.resolve(name)?;
        self.client.initialize().await?;

        let args = Args::from_tokens(tokens);
        debug!(operation = name, args = args.len(), "Invoking operation");
        handler(&self.client, args).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::error::{InitError, NotFound};
    use crate::transport::mock::{MockTransport, Reply};

    fn dispatcher(mock: &Arc<MockTransport>) -> Dispatcher<Arc<MockTransport>> {
        Dispatcher::new(WalletClient::new(mock.clone()))
    }

    #[test]
    fn coercion_is_json_first() {
        assert_eq!(coerce("42"), json!(42));
        assert_eq!(coerce("-7"), json!(-7));
        assert_eq!(coerce("true"), json!(true));
        assert_eq!(coerce("null"), Value::Null);
        assert_eq!(coerce("hello"), json!("hello"));
        assert_eq!(coerce("[1,2]"), json!([1, 2]));
        assert_eq!(coerce(r#"{"a":1}"#), json!({ "a": 1 }));
        assert_eq!(coerce("u1abc def"), json!("u1abc def"));
    }

    #[test]
    fn quoted_token_stays_a_string() {
        assert_eq!(coerce("123"), json!(123));
        assert_eq!(coerce(r#""123""#), json!("123"));
    }

    #[test]
    fn args_read_past_the_end_as_null() {
        let mut args = Args::from_tokens(&["5"]);
        assert_eq!(args.optional::<u32>(0, "a").unwrap(), Some(5));
        assert_eq!(args.optional::<u32>(3, "b").unwrap(), None);
        assert!(matches!(
            args.required::<u32>(1, "c"),
            Err(Error::InvalidArgument { position: 2, name: "c", .. })
        ));
    }

    #[test]
    fn aliases_point_at_operations() {
        let mock = MockTransport::new();
        let dispatcher = dispatcher(&mock);
        for (alias, target) in ALIASES {
            assert!(dispatcher.resolve(alias).is_ok(), "{alias}");
            assert!(dispatcher.resolve(target).is_ok(), "{target}");
        }
        assert_eq!(dispatcher.operation_names().len(), 14);
    }

    #[tokio::test]
    async fn unknown_operation_does_not_contact_backend() {
        let mock = MockTransport::ready();
        let err = dispatcher(&mock)
            .dispatch(&["doesNotExist", "1"])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownOperation(name) if name == "doesNotExist"));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn missing_operation_fails_before_initialization() {
        let mock = MockTransport::ready();
        let tokens: [&str; 0] = [];
        let err = dispatcher(&mock).dispatch(&tokens).await.unwrap_err();
        assert!(matches!(err, Error::MissingOperation));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn initialization_failure_aborts_the_command() {
        let mock = MockTransport::new();
        mock.reply("PingApiVersion", Reply::Unreachable);
        mock.data("GetServerHeight", json!({ "currentHeight": 1 }));

        let err = dispatcher(&mock)
            .dispatch(&["getServerHeight"])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Initialization(InitError::Unreachable(_))
        ));
        assert_eq!(mock.operations(), vec!["PingApiVersion"]);
    }

    #[tokio::test]
    async fn list_accounts_end_to_end() {
        let mock = MockTransport::ready();
        mock.data(
            "GetAccounts",
            json!({ "accounts": [{
                "id": 1,
                "aindex": 0,
                "dindex": 0,
                "birth": 2_000_000,
                "height": 2_100_000,
                "name": "main",
                "balance": 0,
            }] }),
        );

        let result = dispatcher(&mock).dispatch(&["listAccounts"]).await.unwrap();
        let accounts = result.as_array().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0]["id"], 1);
        assert_eq!(accounts[0]["name"], "main");
        assert_eq!(mock.operations(), vec!["PingApiVersion", "GetAccounts"]);
    }

    #[tokio::test]
    async fn extra_arguments_are_ignored() {
        let mock = MockTransport::ready();
        mock.data("GetServerHeight", json!({ "currentHeight": 2_700_000 }));

        let result = dispatcher(&mock)
            .dispatch(&["getServerHeight", "1", "extra"])
            .await
            .unwrap();
        assert_eq!(result, json!(2_700_000));
    }

    #[tokio::test]
    async fn missing_required_argument() {
        let mock = MockTransport::ready();
        let err = dispatcher(&mock)
            .dispatch(&["getBalance"])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidArgument { position: 1, name: "accountId", .. }
        ));
        assert_eq!(mock.operations(), vec!["PingApiVersion"]);
    }

    #[tokio::test]
    async fn numeric_looking_name_must_be_quoted() {
        let mock = MockTransport::ready();
        mock.data("CreateNewAccount", json!({ "createAccount": 3 }));
        let dispatcher = dispatcher(&mock);

        let err = dispatcher
            .dispatch(&["createAccount", r#""""#, "0", "2500000", "123"])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidArgument { position: 4, name: "accountName", .. }
        ));

        let result = dispatcher
            .dispatch(&["createAccount", r#""""#, "0", "2500000", r#""123""#])
            .await
            .unwrap();
        assert_eq!(result, json!(3));
        assert_eq!(
            mock.last_variables(),
            json!({ "newAccount": {
                "key": "",
                "aindex": 0,
                "birth": 2_500_000,
                "name": "123",
                "useInternal": false,
            } })
        );
    }

    #[tokio::test]
    async fn create_account_defaults_key_to_empty() {
        let mock = MockTransport::ready();
        mock.data("CreateNewAccount", json!({ "createAccount": 4 }));

        dispatcher(&mock)
            .dispatch(&["createNewAccount"])
            .await
            .unwrap();
        assert_eq!(
            mock.last_variables(),
            json!({ "newAccount": { "key": "", "useInternal": false } })
        );
    }

    #[tokio::test]
    async fn submit_transaction_from_json_token() {
        let mock = MockTransport::ready();
        mock.data("SendTransaction", json!({ "pay": "ff66" }));

        let result = dispatcher(&mock)
            .dispatch(&[
                "submitTransaction",
                "2",
                r#"[{"address":"u1a","amount":1000,"memo":"hi","tag":"x"},{"address":"u1b","amount":2000}]"#,
            ])
            .await
            .unwrap();
        assert_eq!(result, json!("ff66"));
        assert_eq!(
            mock.last_variables(),
            json!({
                "id": 2,
                "sendTos": [
                    { "address": "u1a", "amount": 1000, "memo": "hi" },
                    { "address": "u1b", "amount": 2000 },
                ],
            })
        );
    }

    #[tokio::test]
    async fn get_last_transaction_id_on_empty_account() {
        let mock = MockTransport::ready();
        mock.data("GetTransactions", json!({ "transactionsByAccount": [] }));

        let err = dispatcher(&mock)
            .dispatch(&["getLastTxId", "8"])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound(NotFound::NoTransactions(AccountId(8)))
        ));
    }

    #[tokio::test]
    async fn synchronize_accepts_single_id_token() {
        let mock = MockTransport::ready();
        mock.data("SynchronizeAccount", json!({ "synchronize": null }));

        dispatcher(&mock).dispatch(&["synchronize", "5"]).await.unwrap();
        assert_eq!(mock.last_variables(), json!({ "ids": [5] }));

        dispatcher(&mock)
            .dispatch(&["synchronize", "[5,6]"])
            .await
            .unwrap();
        assert_eq!(mock.last_variables(), json!({ "ids": [5, 6] }));
    }

    #[tokio::test]
    async fn initialize_as_an_operation_returns_version() {
        let mock = MockTransport::ready();
        let result = dispatcher(&mock).dispatch(&["init"]).await.unwrap();
        assert_eq!(result, json!("1.0"));
    }
}
