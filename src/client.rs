//! Typed access to the wallet backend.
//!
//! Every method issues exactly one request. Nothing is cached; repeated calls always go
//! back to the backend.

use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::{
    data::{
        Account, AccountId, AccountIds, AccountSecret, Address, Balance, NewAccount, Recipient,
        TransactionDetail, TransactionSummary,
    },
    documents::{self, Document},
    error::{Error, InitError, NotFound, TransportError},
    transport::Transport,
};

/// Client for a wallet backend reachable through `T`.
#[derive(Clone, Debug)]
pub struct WalletClient<T> {
    transport: T,
}

impl<T: Transport> WalletClient<T> {
    pub fn new(transport: T) -> Self {
        WalletClient { transport }
    }

    async fn request<R: DeserializeOwned>(
        &self,
        document: &Document,
        variables: Option<Value>,
    ) -> Result<R, Error> {
        let data = self.transport.execute(document, variables).await?;
        serde_json::from_value(data).map_err(|e| {
            TransportError::Malformed(format!("{}: {}", document.operation_name, e)).into()
        })
    }

    /// Probes the backend and returns its API version.
    pub async fn initialize(&self) -> Result<String, Error> {
        #[derive(Deserialize)]
        struct Reply {
            #[serde(rename = "apiVersion", default)]
            api_version: Value,
        }

        let reply: Reply = match self.request(&documents::PING_API_VERSION, None).await {
            Ok(reply) => reply,
            Err(Error::Transport(e)) => return Err(InitError::Unreachable(e).into()),
            Err(Error::Backend(messages)) => {
                return Err(InitError::NotReady(Some(messages.join("; "))).into())
            }
            Err(e) => return Err(e),
        };

        let version = match reply.api_version {
            Value::String(version) => version,
            Value::Number(version) => version.to_string(),
            _ => String::new(),
        };
        if version.is_empty() {
            return Err(InitError::NotReady(None).into());
        }
        info!("Wallet backend API version {}", version);
        Ok(version)
    }

    /// Creates an account and returns the backend's acknowledgment (usually the new id).
    pub async fn create_account(&self, account: &NewAccount) -> Result<Value, Error> {
        #[derive(Deserialize)]
        struct Reply {
            #[serde(rename = "createAccount", default)]
            create_account: Value,
        }

        info!(
            "Creating account{}",
            account
                .name
                .as_ref()
                .map_or(String::new(), |n| format!(" \"{n}\""))
        );
        let reply: Reply = self
            .request(
                &documents::CREATE_NEW_ACCOUNT,
                Some(new_account_variables(account)),
            )
            .await
            .map_err(|e| match e {
                Error::Backend(messages) => Error::AccountCreationRejected(messages),
                e => e,
            })?;
        Ok(reply.create_account)
    }

    /// Lists all accounts in backend order.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, Error> {
        let reply: AccountsReply<Account> = self.request(&documents::GET_ACCOUNTS, None).await?;
        Ok(reply.accounts)
    }

    pub async fn get_account(&self, id: AccountId) -> Result<Account, Error> {
        let reply: AccountsReply<Account> = self
            .request(&documents::GET_ACCOUNT, Some(account_filter(id)))
            .await?;
        first_account(reply, id)
    }

    /// Reveals the seed (or viewing key) and passphrase of an account.
    pub async fn get_account_secret(&self, id: AccountId) -> Result<AccountSecret, Error> {
        let reply: AccountsReply<AccountSecret> = self
            .request(&documents::GET_ACCOUNT_SECRET, Some(account_filter(id)))
            .await?;
        first_account(reply, id)
    }

    pub async fn get_address(&self, id: AccountId) -> Result<Address, Error> {
        #[derive(Deserialize)]
        struct Reply {
            #[serde(rename = "addressByAccount", default)]
            address: Option<Address>,
        }

        let reply: Reply = self
            .request(&documents::GET_ADDRESS, Some(by_account(id)))
            .await?;
        reply.address.ok_or(NotFound::Address(id).into())
    }

    pub async fn get_balance(&self, id: AccountId) -> Result<Balance, Error> {
        #[derive(Deserialize)]
        struct Reply {
            #[serde(rename = "balanceByAccount", default)]
            balance: Option<Balance>,
        }

        let reply: Reply = self
            .request(&documents::GET_TOTAL_BALANCE, Some(by_account(id)))
            .await?;
        reply.balance.ok_or(NotFound::Balance(id).into())
    }

    /// Lists the transactions of an account in backend order. An empty list is not an
    /// error.
    pub async fn list_transactions(&self, id: AccountId) -> Result<Vec<TransactionSummary>, Error> {
        #[derive(Deserialize)]
        struct Reply {
            #[serde(rename = "transactionsByAccount")]
            transactions: Vec<TransactionSummary>,
        }

        let reply: Reply = self
            .request(&documents::GET_TRANSACTIONS, Some(by_account(id)))
            .await?;
        Ok(reply.transactions)
    }

    pub async fn get_transaction(
        &self,
        id: AccountId,
        txid: &str,
    ) -> Result<TransactionDetail, Error> {
        #[derive(Deserialize)]
        struct Reply {
            #[serde(rename = "transactionById", default)]
            transaction: Option<TransactionDetail>,
        }

        let reply: Reply = self
            .request(
                &documents::GET_TRANSACTION_INFO,
                Some(json!({ "id": id, "txid": txid })),
            )
            .await?;
        reply.transaction.ok_or_else(|| {
            NotFound::Transaction {
                account: id,
                txid: txid.to_owned(),
            }
            .into()
        })
    }

    /// Returns the first entry of [`Self::list_transactions`].
    pub async fn get_last_transaction_id(
        &self,
        id: AccountId,
    ) -> Result<TransactionSummary, Error> {
        self.list_transactions(id)
            .await?
            .into_iter()
            .next()
            .ok_or(NotFound::NoTransactions(id).into())
    }

    pub async fn get_server_height(&self) -> Result<u32, Error> {
        #[derive(Deserialize)]
        struct Reply {
            #[serde(rename = "currentHeight")]
            current_height: u32,
        }

        let reply: Reply = self.request(&documents::GET_SERVER_HEIGHT, None).await?;
        Ok(reply.current_height)
    }

    pub async fn get_synced_height(&self, id: AccountId) -> Result<u32, Error> {
        #[derive(Deserialize)]
        struct Height {
            height: u32,
        }

        let reply: AccountsReply<Height> = self
            .request(&documents::GET_WALLET_HEIGHT, Some(account_filter(id)))
            .await?;
        first_account(reply, id).map(|h| h.height)
    }

    /// Submits a payment from `id`. Not idempotent: a retry after an unknown outcome may
    /// pay twice.
    pub async fn submit_transaction(
        &self,
        id: AccountId,
        recipients: &[Recipient],
    ) -> Result<Value, Error> {
        #[derive(Deserialize)]
        struct Reply {
            #[serde(default)]
            pay: Value,
        }

        let variables = send_variables(id, recipients)?;
        info!(
            "Submitting payment from account {} to {} recipient(s)",
            id,
            recipients.len()
        );
        let reply: Reply = self
            .request(&documents::SEND_TRANSACTION, Some(variables))
            .await?;
        Ok(reply.pay)
    }

    /// Asks the backend to synchronize the given accounts and waits for its single answer.
    pub async fn synchronize(&self, ids: impl Into<AccountIds>) -> Result<Value, Error> {
        #[derive(Deserialize)]
        struct Reply {
            #[serde(default)]
            synchronize: Value,
        }

        let ids = ids.into();
        info!("Synchronizing {} account(s)", ids.0.len());
        let reply: Reply = self
            .request(&documents::SYNCHRONIZE_ACCOUNT, Some(json!({ "ids": ids.0 })))
            .await?;
        debug!("Synchronization finished");
        Ok(reply.synchronize)
    }
}

#[derive(Deserialize)]
struct AccountsReply<A> {
    accounts: Vec<A>,
}

fn first_account<A>(reply: AccountsReply<A>, id: AccountId) -> Result<A, Error> {
    reply
        .accounts
        .into_iter()
        .next()
        .ok_or(NotFound::Account(id).into())
}

fn account_filter(id: AccountId) -> Value {
    json!({ "filter": { "id": id } })
}

fn by_account(id: AccountId) -> Value {
    json!({ "id": id })
}

/// `newAccount` input. `key` is always present and `useInternal` is always false; the
/// remaining fields are sent only when set.
fn new_account_variables(account: &NewAccount) -> Value {
    let mut input = Map::new();
    input.insert("key".to_owned(), account.key.clone().into());
    if let Some(aindex) = account.account_index {
        input.insert("aindex".to_owned(), aindex.into());
    }
    if let Some(birth) = account.birth {
        input.insert("birth".to_owned(), birth.into());
    }
    if let Some(name) = &account.name {
        input.insert("name".to_owned(), name.clone().into());
    }
    if let Some(passphrase) = &account.passphrase {
        input.insert(
            "passphrase".to_owned(),
            passphrase.expose_secret().clone().into(),
        );
    }
    input.insert("useInternal".to_owned(), false.into());

    json!({ "newAccount": input })
}

/// `pay` input: address, amount and memo of each recipient, in caller order.
fn send_variables(id: AccountId, recipients: &[Recipient]) -> Result<Value, Error> {
    for (idx, recipient) in recipients.iter().enumerate() {
        if recipient.address.trim().is_empty() {
            return Err(Error::InvalidRecipient(idx));
        }
        if !recipient.amount.is_positive() {
            return Err(Error::InvalidAmount(idx));
        }
    }

    Ok(json!({ "id": id, "sendTos": recipients }))
}
