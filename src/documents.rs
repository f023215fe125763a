//! Fixed GraphQL documents, one per backend operation.

/// A query or mutation document together with its operation name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Document {
    pub operation_name: &'static str,
    pub source: &'static str,
}

pub(crate) const PING_API_VERSION: Document = Document {
    operation_name: "PingApiVersion",
    source: r#"
query PingApiVersion {
  apiVersion
}
"#,
};

pub(crate) const CREATE_NEW_ACCOUNT: Document = Document {
    operation_name: "CreateNewAccount",
    source: r#"
mutation CreateNewAccount($newAccount: NewAccount!) {
  createAccount(newAccount: $newAccount)
}
"#,
};

pub(crate) const GET_ACCOUNTS: Document = Document {
    operation_name: "GetAccounts",
    source: r#"
query GetAccounts {
  accounts {
    aindex
    dindex
    birth
    height
    name
    balance
    id
  }
}
"#,
};

pub(crate) const GET_ACCOUNT: Document = Document {
    operation_name: "GetAccount",
    source: r#"
query GetAccount($filter: AccountFilter!) {
  accounts(accountFilter: $filter) {
    aindex
    dindex
    birth
    height
    name
    balance
    id
  }
}
"#,
};

pub(crate) const GET_ACCOUNT_SECRET: Document = Document {
    operation_name: "GetAccountSecret",
    source: r#"
query GetAccountSecret($filter: AccountFilter!) {
  accounts(accountFilter: $filter) {
    seed
    passphrase
    birth
    aindex
  }
}
"#,
};

pub(crate) const GET_ADDRESS: Document = Document {
    operation_name: "GetAddress",
    source: r#"
query GetAddress($id: Int!) {
  addressByAccount(idAccount: $id) {
    ua
    orchard
    sapling
    transparent
  }
}
"#,
};

pub(crate) const GET_TOTAL_BALANCE: Document = Document {
    operation_name: "GetTotalBalance",
    source: r#"
query GetTotalBalance($id: Int!) {
  balanceByAccount(idAccount: $id) {
    transparent
    sapling
    orchard
    total
  }
}
"#,
};

pub(crate) const GET_TRANSACTIONS: Document = Document {
    operation_name: "GetTransactions",
    source: r#"
query GetTransactions($id: Int!) {
  transactionsByAccount(idAccount: $id) {
    txid
    value
    fee
    time
    height
  }
}
"#,
};

pub(crate) const GET_TRANSACTION_INFO: Document = Document {
    operation_name: "GetTransactionInfo",
    source: r#"
query GetTransactionInfo($id: Int!, $txid: String!) {
  transactionById(idAccount: $id, txid: $txid) {
    txid
    value
    fee
    time
    height
    notes {
      address
      memo
      value
      pool
    }
    outputs {
      address
      memo
      value
      pool
    }
    spends {
      address
      diversifier
      memo
      value
      pool
    }
  }
}
"#,
};

pub(crate) const GET_SERVER_HEIGHT: Document = Document {
    operation_name: "GetServerHeight",
    source: r#"
query GetServerHeight {
  currentHeight
}
"#,
};

pub(crate) const GET_WALLET_HEIGHT: Document = Document {
    operation_name: "GetWalletHeight",
    source: r#"
query GetWalletHeight($filter: AccountFilter!) {
  accounts(accountFilter: $filter) {
    height
  }
}
"#,
};

pub(crate) const SEND_TRANSACTION: Document = Document {
    operation_name: "SendTransaction",
    source: r#"
mutation SendTransaction($id: Int!, $sendTos: [Recipient!]!) {
  pay(idAccount: $id, payment: { recipients: $sendTos })
}
"#,
};

pub(crate) const SYNCHRONIZE_ACCOUNT: Document = Document {
    operation_name: "SynchronizeAccount",
    source: r#"
mutation SynchronizeAccount($ids: [Int!]!) {
  synchronize(idAccounts: $ids)
}
"#,
};
