// Copyright 2025 jonefeewang@gmail.com
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Inbound frame tags, one per event variant. Gaps are reserved for
//! family growth; unknown tags are skipped by the dispatcher, so adding
//! a tag on the gateway side never breaks an older client.

// session / diagnostics
pub const CONNECT_ACK: u16 = 1;
pub const NEXT_VALID_ORDER_ID: u16 = 2;
pub const CURRENT_TIME: u16 = 3;
pub const ERROR: u16 = 4;
pub const MANAGED_ACCOUNTS: u16 = 5;

// tick data
pub const TICK_PRICE: u16 = 10;
pub const TICK_SIZE: u16 = 11;
pub const TICK_STRING: u16 = 12;
pub const TICK_GENERIC: u16 = 13;
pub const TICK_EFP: u16 = 14;
pub const TICK_OPTION_COMPUTATION: u16 = 15;
pub const TICK_NEWS: u16 = 16;
pub const TICK_SNAPSHOT_END: u16 = 17;
pub const MARKET_DATA_TYPE: u16 = 18;
pub const TICK_REQUEST_PARAMS: u16 = 19;

// tick-by-tick
pub const TICK_BY_TICK_LAST: u16 = 20;
pub const TICK_BY_TICK_BID_ASK: u16 = 21;
pub const TICK_BY_TICK_MIDPOINT: u16 = 22;

// market depth
pub const MARKET_DEPTH_UPDATE: u16 = 25;
pub const MARKET_DEPTH_L2_UPDATE: u16 = 26;
pub const MARKET_DEPTH_END: u16 = 27;
pub const MARKET_DEPTH_EXCHANGES: u16 = 28;

// orders
pub const OPEN_ORDER: u16 = 30;
pub const OPEN_ORDER_END: u16 = 31;
pub const ORDER_STATUS: u16 = 32;
pub const ORDER_BOUND: u16 = 33;
pub const COMPLETED_ORDER: u16 = 34;
pub const COMPLETED_ORDERS_END: u16 = 35;
pub const COMMISSION_REPORT: u16 = 36;
pub const EXECUTION_DETAILS: u16 = 37;
pub const EXECUTION_DETAILS_END: u16 = 38;

// account
pub const ACCOUNT_VALUE: u16 = 40;
pub const PORTFOLIO_UPDATE: u16 = 41;
pub const ACCOUNT_UPDATE_TIME: u16 = 42;
pub const ACCOUNT_DOWNLOAD_END: u16 = 43;
pub const ACCOUNT_SUMMARY: u16 = 44;
pub const ACCOUNT_SUMMARY_END: u16 = 45;
pub const ACCOUNT_UPDATE_MULTI: u16 = 46;
pub const ACCOUNT_UPDATE_MULTI_END: u16 = 47;
pub const POSITION: u16 = 48;
pub const POSITION_END: u16 = 49;
pub const POSITION_MULTI: u16 = 50;
pub const POSITION_MULTI_END: u16 = 51;
pub const PNL: u16 = 52;
pub const PNL_SINGLE: u16 = 53;
pub const FAMILY_CODES: u16 = 54;
pub const USER_INFO: u16 = 55;

// contract reference data
pub const CONTRACT_DETAILS: u16 = 60;
pub const BOND_CONTRACT_DETAILS: u16 = 61;
pub const CONTRACT_DETAILS_END: u16 = 62;
pub const SYMBOL_SAMPLES: u16 = 63;
pub const SMART_COMPONENTS: u16 = 64;
pub const MARKET_RULE: u16 = 65;
pub const SOFT_DOLLAR_TIERS: u16 = 66;
pub const OPTION_CHAIN_PARAMETER: u16 = 67;
pub const OPTION_CHAIN_PARAMETER_END: u16 = 68;
pub const DELTA_NEUTRAL_VALIDATION: u16 = 69;

// historical data
pub const HISTORICAL_BAR: u16 = 70;
pub const HISTORICAL_BARS_END: u16 = 71;
pub const HISTORICAL_BAR_UPDATE: u16 = 72;
pub const HEAD_TIMESTAMP: u16 = 73;
pub const HISTOGRAM_DATA: u16 = 74;
pub const HISTORICAL_TICKS: u16 = 75;
pub const HISTORICAL_TICKS_BID_ASK: u16 = 76;
pub const HISTORICAL_TICKS_LAST: u16 = 77;
pub const HISTORICAL_SCHEDULE: u16 = 78;
pub const REAL_TIME_BAR: u16 = 79;

// news
pub const NEWS_BULLETIN: u16 = 80;
pub const NEWS_PROVIDERS: u16 = 81;
pub const NEWS_ARTICLE: u16 = 82;
pub const HISTORICAL_NEWS: u16 = 83;
pub const HISTORICAL_NEWS_END: u16 = 84;

// scanner
pub const SCANNER_PARAMETERS: u16 = 85;
pub const SCANNER_DATA: u16 = 86;
pub const SCANNER_DATA_END: u16 = 87;

// fundamentals
pub const FUNDAMENTAL_DATA: u16 = 88;

// display groups
pub const DISPLAY_GROUP_LIST: u16 = 90;
pub const DISPLAY_GROUP_UPDATED: u16 = 91;

// wall street horizon
pub const WSH_META_DATA: u16 = 92;
pub const WSH_EVENT_DATA: u16 = 93;
